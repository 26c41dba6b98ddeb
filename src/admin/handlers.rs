use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::container::InjectionTarget;
use crate::lifecycle::report::StartupReport;
use crate::routing::ParameterBinding;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub beans: usize,
    pub routes: usize,
    pub issues: usize,
}

#[derive(Serialize)]
pub struct RouteStatus {
    pub url: String,
    pub owner: String,
    pub handler: String,
    pub parameters: Vec<ParameterBinding>,
}

#[derive(Serialize)]
pub struct BeanStatus {
    pub name: String,
    pub component: &'static str,
    pub stereotype: &'static str,
    pub primary: bool,
}

#[derive(Serialize)]
pub struct BeansSummary {
    pub beans: Vec<BeanStatus>,
    pub injections: Vec<InjectionTarget>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let report = state.context.report();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if report.is_clean() { "operational" } else { "degraded" },
        beans: report.beans,
        routes: report.routes,
        issues: report.issues.len(),
    })
}

pub async fn get_routes(State(state): State<AdminState>) -> Json<Vec<RouteStatus>> {
    let routes = state
        .context
        .routes()
        .routes()
        .into_iter()
        .map(|route| RouteStatus {
            url: route.url.clone(),
            owner: route.owner.clone(),
            handler: route.handler_label(),
            parameters: route.parameters.clone(),
        })
        .collect();
    Json(routes)
}

pub async fn get_beans(State(state): State<AdminState>) -> Json<BeansSummary> {
    let beans = state
        .context
        .registry()
        .entries()
        .into_iter()
        .map(|(name, bean)| BeanStatus {
            name: name.to_string(),
            component: bean.qualified_name,
            stereotype: bean.stereotype.label(),
            primary: name == bean.name,
        })
        .collect();

    Json(BeansSummary {
        beans,
        injections: state.context.injections().to_vec(),
    })
}

pub async fn get_report(State(state): State<AdminState>) -> Json<StartupReport> {
    Json(state.context.report().clone())
}
