use super::response::error_response;
use super::state::AppState;
use crate::log_debug;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// 超限请求直接返回 429，不进入任何链上或数据库查询
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let ip = client_ip(&request);
    if state.limiter.allow(ip) {
        return next.run(request).await;
    }

    log_debug!("客户端 {} 请求过于频繁", ip);
    let mut response = error_response(
        StatusCode::TOO_MANY_REQUESTS,
        "请求过于频繁，请稍后再试".to_string(),
    );
    let retry_after = state.limiter.retry_after().as_secs().max(1);
    if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}
