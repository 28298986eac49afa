//! Client-side exchange logging.

use std::{fmt, time::Instant};

use super::{ExchangeRedactor, HttpRequest, HttpResponse, millis};
use crate::{
    config::{Config, RedactionFailure},
    context::{HEADER_LOG_ID, RequestContext},
    logger::{Logger, emit},
    redaction::RedactKeys,
};

/// Logs outgoing requests and the responses, or errors, they produce.
#[derive(Clone, Debug)]
pub struct ClientLogging {
    logger: Logger,
    redactor: ExchangeRedactor,
}

impl ClientLogging {
    pub fn new(logger: Logger, keys: RedactKeys) -> Self {
        Self {
            logger,
            redactor: ExchangeRedactor {
                keys,
                on_failure: RedactionFailure::default(),
            },
        }
    }

    pub fn from_config(logger: Logger, config: &Config) -> Self {
        Self::new(logger, config.redact_keys())
            .with_redaction_failure(config.on_redaction_failure)
    }

    #[must_use]
    pub fn with_redaction_failure(mut self, on_failure: RedactionFailure) -> Self {
        self.redactor.on_failure = on_failure;
        self
    }

    /// Sends `request` through `transport`, logging both sides of the call.
    ///
    /// When `context` is given, its log id is set on the outgoing
    /// `X-Request-ID` header and attached to the records. Transport errors are
    /// logged and returned unchanged.
    pub fn send<F, E>(
        &self,
        context: Option<&RequestContext>,
        request: &mut HttpRequest,
        transport: F,
    ) -> Result<HttpResponse, E>
    where
        F: FnOnce(&HttpRequest) -> Result<HttpResponse, E>,
        E: fmt::Display,
    {
        let started = Instant::now();
        let logger = match context {
            Some(context) => {
                request
                    .headers
                    .insert(HEADER_LOG_ID, context.log_id().as_str());
                self.logger.with_log_id(context.log_id())
            }
            None => self.logger.clone(),
        };

        let request: &HttpRequest = request;
        let headers = self.redactor.headers(&request.headers);
        let body = self.redactor.body(&logger, &request.body);
        emit!(logger, INFO, {
            method = %request.method,
            url = %request.target,
            headers = %headers,
            body = %body,
        }, "Client request sent");

        let outcome = transport(request);
        let latency_ms = millis(started.elapsed());
        match outcome {
            Ok(response) => {
                self.log_response(&logger, request, &response, latency_ms);
                Ok(response)
            }
            Err(err) => {
                emit!(logger, ERROR, {
                    error = %err,
                    latency_ms = latency_ms,
                }, "Client request failed");
                Err(err)
            }
        }
    }

    fn log_response(
        &self,
        logger: &Logger,
        request: &HttpRequest,
        response: &HttpResponse,
        latency_ms: u64,
    ) {
        let body = self.redactor.body(logger, &response.body);
        emit!(logger, INFO, {
            method = %request.method,
            url = %request.target,
            status = response.status,
            latency_ms = latency_ms,
            body = %body,
        }, "Client response received");
    }
}
