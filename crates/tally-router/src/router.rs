//! Route table and request dispatch.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, RouterError};
use crate::middleware::{BoxFuture, Middleware, MiddlewareResult};
use crate::path::PathPattern;
use crate::request::{Method, PathParams, Request};
use crate::response::Response;

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A single route definition.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler: Handler,
}

impl Route {
    /// Creates a route, failing on a malformed pattern.
    pub fn new<F, Fut>(method: Method, pattern: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Ok(Self {
            method,
            pattern: PathPattern::parse(pattern)?,
            handler: Arc::new(move |req| Box::pin(handler(req))),
        })
    }
}

/// Routes sharing a path prefix.
pub struct RouteGroup {
    prefix: String,
    routes: Vec<Route>,
}

impl RouteGroup {
    /// Creates an empty group under `prefix`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            routes: Vec::new(),
        }
    }

    /// Adds a route below the prefix.
    pub fn route<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let full_path = format!("{}{}", self.prefix, path);
        self.routes.push(Route::new(method, &full_path, handler)?);
        Ok(self)
    }

    /// Adds a GET route.
    pub fn get<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Get, path, handler)
    }

    /// Adds a POST route.
    pub fn post<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Post, path, handler)
    }

    /// Adds a PUT route.
    pub fn put<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Put, path, handler)
    }

    /// Adds a DELETE route.
    pub fn delete<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Delete, path, handler)
    }
}

/// Dispatches requests to the first route whose pattern and method match.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the routes of a group.
    #[must_use]
    pub fn group(mut self, group: RouteGroup) -> Self {
        self.routes.extend(group.routes);
        self
    }

    /// Adds middleware. The first added runs first before the handler and
    /// last after it.
    #[must_use]
    pub fn middleware(mut self, mw: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(mw));
        self
    }

    /// Returns the number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns whether no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Handles a request.
    pub fn handle(&self, mut request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            let mut ran = 0;
            let mut early = None;
            for mw in &self.middleware {
                ran += 1;
                if let MiddlewareResult::Response(res) = mw.before(&mut request).await {
                    early = Some(res);
                    break;
                }
            }

            let mut response = match early {
                Some(res) => res,
                None => self.dispatch(&mut request).await,
            };

            for mw in self.middleware[..ran].iter().rev() {
                response = mw.after(&request, response).await;
            }
            response
        })
    }

    async fn dispatch(&self, request: &mut Request) -> Response {
        match self.find_route(request) {
            Ok((route, params)) => {
                request.params = params;
                (route.handler)(request.clone()).await
            }
            Err(RouterError::MethodNotAllowed { .. }) => Response::method_not_allowed(),
            Err(e) => {
                debug!("{}", e);
                Response::not_found()
            }
        }
    }

    fn find_route(&self, request: &Request) -> Result<(&Route, PathParams)> {
        let mut path_matched = false;

        for route in &self.routes {
            if let Some(params) = route.pattern.match_path(&request.path) {
                if route.method == request.method {
                    return Ok((route, params));
                }
                path_matched = true;
            }
        }

        if path_matched {
            Err(RouterError::MethodNotAllowed {
                method: request.method.to_string(),
                path: request.path.clone(),
            })
        } else {
            Err(RouterError::NotFound {
                method: request.method.to_string(),
                path: request.path.clone(),
            })
        }
    }
}
