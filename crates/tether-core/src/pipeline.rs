//! Pipeline construction
//!
//! A [`Pipeline`] is an ordered middleware stack in front of a terminal
//! handler, usually the transport that actually sends the request.

use crate::middleware::{HandlerFn, Middleware, Next};
use crate::{Body, Result};
use http::{Request, Response};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Pipeline builder
#[derive(Default)]
pub struct PipelineBuilder {
    middlewares: Vec<Arc<dyn Middleware>>,
    handler: Option<HandlerFn>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
            handler: None,
        }
    }

    /// Append a middleware to the end of the chain
    #[must_use]
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Set the terminal handler invoked after the last middleware
    #[must_use]
    pub fn handler(mut self, handler: HandlerFn) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Build the pipeline
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stack: self.middlewares.into(),
            handler: self.handler.map(Arc::new),
        }
    }

    /// Get the number of middlewares in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Check if the chain is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("middlewares", &self.middlewares)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// An immutable, shareable middleware chain
#[derive(Clone)]
pub struct Pipeline {
    stack: Arc<[Arc<dyn Middleware>]>,
    handler: Option<Arc<HandlerFn>>,
}

impl Pipeline {
    /// Start a builder
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Send a request through every stage, starting at the first middleware
    pub async fn execute(&self, req: Request<Body>) -> Result<Response<Body>> {
        trace!(
            method = %req.method(),
            uri = %req.uri(),
            stages = self.stack.len(),
            "Executing pipeline"
        );
        self.entry().run(req).await
    }

    /// Continuation positioned at the first stage
    pub fn entry(&self) -> Next {
        Next::with_shared_handler(Arc::clone(&self.stack), self.handler.clone())
    }

    /// Number of middlewares in the chain
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether the chain has no middleware
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stack", &self.stack)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;
    use http::HeaderValue;

    #[derive(Debug)]
    struct Tag(&'static str);

    #[async_trait]
    impl Middleware for Tag {
        async fn call(&self, mut req: Request<Body>, next: Next) -> Result<Response<Body>> {
            req.headers_mut()
                .append("x-stage", HeaderValue::from_static(self.0));
            next.run(req).await
        }
    }

    fn echo_stages() -> HandlerFn {
        Box::new(|req: Request<Body>| {
            Box::pin(async move {
                let stages: Vec<&str> = req
                    .headers()
                    .get_all("x-stage")
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .collect();
                Ok::<_, Error>(Response::new(Body::from(stages.join(","))))
            })
        })
    }

    #[test]
    fn test_builder_empty() {
        let builder = PipelineBuilder::new();
        assert!(builder.is_empty());
        let pipeline = builder.build();
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_builder_counts_middlewares() {
        let builder = Pipeline::builder()
            .with_middleware(Arc::new(Tag("a")))
            .with_middleware(Arc::new(Tag("b")));
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.build().len(), 2);
    }

    #[tokio::test]
    async fn test_execute_runs_stages_in_order() {
        let pipeline = Pipeline::builder()
            .with_middleware(Arc::new(Tag("first")))
            .with_middleware(Arc::new(Tag("second")))
            .handler(echo_stages())
            .build();

        let req = Request::builder().uri("/").body(Body::absent()).unwrap();
        let body = pipeline
            .execute(req)
            .await
            .unwrap()
            .into_body()
            .collect_bytes()
            .await
            .unwrap();
        assert_eq!(body, "first,second");
    }

    #[tokio::test]
    async fn test_execute_without_handler() {
        let pipeline = Pipeline::builder()
            .with_middleware(Arc::new(Tag("only")))
            .build();
        let req = Request::builder().body(Body::absent()).unwrap();
        assert!(matches!(
            pipeline.execute(req).await,
            Err(Error::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_pipeline_is_reusable() {
        let pipeline = Pipeline::builder()
            .with_middleware(Arc::new(Tag("x")))
            .handler(echo_stages())
            .build();

        for _ in 0..3 {
            let req = Request::builder().body(Body::absent()).unwrap();
            let response = pipeline.clone().execute(req).await.unwrap();
            assert_eq!(response.into_body().collect_bytes().await.unwrap(), "x");
        }
    }
}
