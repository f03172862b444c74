//! Middleware trait and the chain continuation

use crate::{Body, Error, Result};
use async_trait::async_trait;
use http::{Request, Response};
use std::fmt;
use std::sync::Arc;

/// Middleware trait for request/response processing
#[async_trait]
pub trait Middleware: Send + Sync + fmt::Debug {
    /// Process a request
    ///
    /// # Arguments
    ///
    /// * `req` - The outgoing HTTP request
    /// * `next` - The next middleware/handler in the chain
    ///
    /// # Returns
    ///
    /// Returns the HTTP response or an error
    async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>>;
}

/// Type alias for the final handler function
pub type HandlerFn = Box<
    dyn Fn(
            Request<Body>,
        )
            -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response<Body>>> + Send>>
        + Send
        + Sync,
>;

/// Represents the next middleware/handler in the chain
///
/// `Next` is a cursor into an immutable stack. Cloning it and running the
/// clone re-executes every downstream stage from the same position, which is
/// what lets a stage retry a request.
pub struct Next {
    middleware_stack: Arc<[Arc<dyn Middleware>]>,
    index: usize,
    final_handler: Option<Arc<HandlerFn>>,
}

impl Next {
    /// Create a new Next from a middleware stack
    pub fn new(middleware_stack: Arc<[Arc<dyn Middleware>]>) -> Self {
        Self {
            middleware_stack,
            index: 0,
            final_handler: None,
        }
    }

    /// Create a new Next with a final handler
    pub fn with_handler(middleware_stack: Arc<[Arc<dyn Middleware>]>, handler: HandlerFn) -> Self {
        Self::with_shared_handler(middleware_stack, Some(Arc::new(handler)))
    }

    pub(crate) fn with_shared_handler(
        middleware_stack: Arc<[Arc<dyn Middleware>]>,
        final_handler: Option<Arc<HandlerFn>>,
    ) -> Self {
        Self {
            middleware_stack,
            index: 0,
            final_handler,
        }
    }

    /// Position of the stage this continuation will invoke
    pub fn index(&self) -> usize {
        self.index
    }

    /// Run the next middleware or final handler
    pub async fn run(self, req: Request<Body>) -> Result<Response<Body>> {
        if let Some(middleware) = self.middleware_stack.get(self.index) {
            let next = Self {
                middleware_stack: Arc::clone(&self.middleware_stack),
                index: self.index + 1,
                final_handler: self.final_handler.clone(),
            };
            middleware.call(req, next).await
        } else if let Some(handler) = self.final_handler {
            handler(req).await
        } else {
            Err(Error::Internal(
                "Middleware chain completed without handler".to_string(),
            ))
        }
    }
}

impl Clone for Next {
    fn clone(&self) -> Self {
        Self {
            middleware_stack: Arc::clone(&self.middleware_stack),
            index: self.index,
            final_handler: self.final_handler.clone(),
        }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field(
                "remaining",
                &self.middleware_stack.len().saturating_sub(self.index),
            )
            .field("has_handler", &self.final_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CountingMiddleware {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Middleware for CountingMiddleware {
        async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            next.run(req).await
        }
    }

    #[derive(Debug)]
    struct TwiceMiddleware;

    #[async_trait]
    impl Middleware for TwiceMiddleware {
        async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
            let retry = Request::builder()
                .uri(req.uri().clone())
                .body(Body::absent())?;
            next.clone().run(req).await?;
            next.run(retry).await
        }
    }

    fn ok_handler() -> HandlerFn {
        Box::new(|_req| Box::pin(async { Ok(Response::new(Body::from("ok"))) }))
    }

    #[tokio::test]
    async fn test_chain_without_handler_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let first = Arc::new(CountingMiddleware {
            calls: Arc::clone(&calls),
        }) as Arc<dyn Middleware>;
        let second = Arc::new(CountingMiddleware {
            calls: Arc::clone(&calls),
        }) as Arc<dyn Middleware>;

        let stack: Arc<[Arc<dyn Middleware>]> = Arc::new([first, second]);
        let next = Next::new(stack);

        let req = Request::builder()
            .uri("/test")
            .body(Body::from("test"))
            .unwrap();

        let result = next.run(req).await;
        assert!(matches!(result, Err(Error::Internal(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_chain_reaches_handler() {
        let stack: Arc<[Arc<dyn Middleware>]> = Arc::new([]);
        let next = Next::with_handler(stack, ok_handler());
        assert_eq!(next.index(), 0);

        let req = Request::builder().body(Body::absent()).unwrap();
        let response = next.run(req).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_next_can_run_twice() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counting = Arc::new(CountingMiddleware {
            calls: Arc::clone(&calls),
        }) as Arc<dyn Middleware>;

        let stack: Arc<[Arc<dyn Middleware>]> = Arc::new([Arc::new(TwiceMiddleware), counting]);
        let next = Next::with_handler(stack, ok_handler());

        let req = Request::builder().uri("/twice").body(Body::absent()).unwrap();
        next.run(req).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_debug_reports_cursor() {
        let stack: Arc<[Arc<dyn Middleware>]> = Arc::new([]);
        let next = Next::new(stack);
        let debug = format!("{next:?}");
        assert!(debug.contains("index: 0"));
        assert!(debug.contains("remaining: 0"));
    }
}
