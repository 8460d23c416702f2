//! Serving the router over HTTP/1.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tally_router::{Method, Request, Response, Router};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Converts a hyper request into a router request, or answers it directly
/// when it cannot be routed.
async fn from_hyper(req: HyperRequest<Incoming>) -> std::result::Result<Request, Response> {
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        return Err(Response::method_not_allowed());
    };
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());

    let mut request = Request::new(method, &target);
    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request = request.header(key.as_str(), v);
        }
    }

    match req.collect().await {
        Ok(body) => request.body = body.to_bytes().to_vec(),
        Err(e) => {
            warn!(error = %e, "failed to read request body");
            return Err(Response::failure(400, "Bad request."));
        }
    }
    Ok(request)
}

/// Converts a router response into a hyper response.
fn to_hyper(res: Response) -> HyperResponse<Full<Bytes>> {
    let mut builder = HyperResponse::builder()
        .status(StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));
    for (key, value) in &res.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
        .body(Full::new(Bytes::from(res.body)))
        .unwrap_or_else(|e| {
            warn!(error = %e, "invalid response headers");
            let mut fallback = HyperResponse::new(Full::new(Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

async fn handle(req: HyperRequest<Incoming>, router: Arc<Router>) -> Result<HyperResponse<Full<Bytes>>, Infallible> {
    let response = match from_hyper(req).await {
        Ok(request) => router.handle(request).await,
        Err(response) => response,
    };
    Ok(to_hyper(response))
}

/// Accepts connections until the listener fails, one task per connection.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let router = Arc::new(router);
    info!(%addr, routes = router.len(), "listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let router = Arc::clone(&router);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle(req, Arc::clone(&router)));
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, error = %err, "connection closed with error");
            }
        });
    }
}
