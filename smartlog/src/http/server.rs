//! Server-side exchange logging.

use std::{collections::HashSet, time::Instant};

use super::{ExchangeRedactor, HttpRequest, HttpResponse, millis};
use crate::{
    config::Config,
    context::{LogId, RequestContext},
    logger::{Logger, emit},
};

/// Logs incoming requests and the responses sent for them.
///
/// ```rust
/// use smartlog::{Config, HttpRequest, HttpResponse, Logger, ServerLogging};
///
/// let config = Config::default();
/// let server = ServerLogging::new(Logger::from_config(&config), &config);
///
/// let request = HttpRequest::new("GET", "/users/1");
/// let response = server.handle(&request, |ctx, _request| {
///     assert!(!ctx.log_id().as_str().is_empty());
///     HttpResponse::new(200).body(r#"{"id":1}"#)
/// });
/// assert_eq!(response.status, 200);
/// ```
#[derive(Clone, Debug)]
pub struct ServerLogging {
    logger: Logger,
    redactor: ExchangeRedactor,
    skip_paths: HashSet<String>,
}

impl ServerLogging {
    pub fn new(logger: Logger, config: &Config) -> Self {
        Self {
            logger,
            redactor: ExchangeRedactor {
                keys: config.redact_keys(),
                on_failure: config.on_redaction_failure,
            },
            skip_paths: config.skip_paths.iter().cloned().collect(),
        }
    }

    /// Whether requests to `path` go unlogged.
    pub fn is_skipped(&self, path: &str) -> bool {
        self.skip_paths.contains(path)
    }

    /// Records an incoming request and starts timing it.
    ///
    /// Returns `None`, and records nothing, for skipped paths. The log id is
    /// taken from `X-Request-ID` when the client sent one.
    pub fn begin(&self, request: &HttpRequest) -> Option<ServerExchange<'_>> {
        let path = request.path();
        if self.is_skipped(path) {
            return None;
        }
        let started = Instant::now();
        let context = RequestContext::new(
            &self.logger,
            LogId::from_headers_or_generate(&request.headers),
        );

        let logger = context.logger();
        let headers = self.redactor.headers(&request.headers);
        let body = self.redactor.body(logger, &request.body);
        emit!(logger, INFO, {
            method = %request.method,
            path = %path,
            headers = %headers,
            body = %body,
        }, "Request received");

        Some(ServerExchange {
            server: self,
            method: request.method.clone(),
            path: path.to_string(),
            context,
            started,
        })
    }

    /// Runs `handler` between the request and response records.
    ///
    /// Skipped paths still get a context, with no records emitted.
    pub fn handle<F>(&self, request: &HttpRequest, handler: F) -> HttpResponse
    where
        F: FnOnce(&RequestContext, &HttpRequest) -> HttpResponse,
    {
        match self.begin(request) {
            Some(exchange) => {
                let response = handler(exchange.context(), request);
                exchange.finish(&response);
                response
            }
            None => {
                let context = RequestContext::new(
                    &self.logger,
                    LogId::from_headers_or_generate(&request.headers),
                );
                handler(&context, request)
            }
        }
    }
}

/// An in-flight request, started by [`ServerLogging::begin`].
#[derive(Debug)]
pub struct ServerExchange<'a> {
    server: &'a ServerLogging,
    method: String,
    path: String,
    context: RequestContext,
    started: Instant,
}

impl ServerExchange<'_> {
    /// Context to hand to the request handler.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Records the response with the request's latency.
    pub fn finish(self, response: &HttpResponse) {
        let latency_ms = millis(self.started.elapsed());
        let logger = self.context.logger();
        let body = self.server.redactor.body(logger, &response.body);
        emit!(logger, INFO, {
            method = %self.method,
            path = %self.path,
            status = response.status,
            latency_ms = latency_ms,
            body = %body,
        }, "Response sent");
    }
}
