//! Sample application served by the `mvc-dispatch` binary.
//!
//! ```text
//! GET /test/get?name=World  → "Hello World"
//! GET /test/add             → empty 200
//! ```

pub mod controller;
pub mod service;

/// Keeps the demo registrations linked into binaries that use the library.
pub fn link() {
    std::hint::black_box(controller::TestController::describe_routes as fn() -> usize);
    std::hint::black_box(service::MyServiceImpl::new as fn() -> service::MyServiceImpl);
}
