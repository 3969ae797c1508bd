use crate::application::pipeline::Pipeline;
use crate::domain::envelope::{Destination, Envelope, Params};
use crate::domain::event::Event;
use crate::domain::plugin::{PluginEntry, Step};
use crate::domain::ports::{EventSinkBox, Gateway, ResolverBox, TransportBox};
use crate::domain::shortcut::Shortcut;
use crate::error::{ConfigErrorCode, ParamsErrorCode, PayError, ResponseErrorCode, Result};
use crate::infrastructure::in_memory::NullEventSink;
use std::sync::Arc;
use tracing::{Dispatch, error, info};

/// The public entry point for talking to one payment gateway.
///
/// A `Provider` only holds its injected collaborators and never changes
/// after construction, so one instance can serve concurrent calls; every
/// call gets its own [`Envelope`].
pub struct Provider<G: Gateway> {
    gateway: G,
    resolver: ResolverBox,
    transport: Option<TransportBox>,
    events: EventSinkBox,
    logger: Option<Dispatch>,
}

pub struct ProviderBuilder<G: Gateway> {
    gateway: G,
    resolver: ResolverBox,
    transport: Option<TransportBox>,
    events: EventSinkBox,
    logger: Option<Dispatch>,
}

impl<G: Gateway> ProviderBuilder<G> {
    pub fn transport(mut self, transport: TransportBox) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn events(mut self, events: EventSinkBox) -> Self {
        self.events = events;
        self
    }

    /// Routes the provider's log records to `dispatch` instead of the
    /// process-wide subscriber.
    pub fn logger(mut self, dispatch: Dispatch) -> Self {
        self.logger = Some(dispatch);
        self
    }

    pub fn build(self) -> Provider<G> {
        Provider {
            gateway: self.gateway,
            resolver: self.resolver,
            transport: self.transport,
            events: self.events,
            logger: self.logger,
        }
    }
}

impl<G: Gateway> Provider<G> {
    /// Starts a provider for `gateway`, resolving identifiers through `resolver`.
    ///
    /// Without a transport the provider can still run chains that never set
    /// a radar; chains that do will fail with `InvalidConfig`.
    pub fn builder(gateway: G, resolver: ResolverBox) -> ProviderBuilder<G> {
        ProviderBuilder {
            gateway,
            resolver,
            transport: None,
            events: Arc::new(NullEventSink),
            logger: None,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Runs the shortcut registered as `operation`, with the gateway's common
    /// plugins merged in.
    pub fn call(&self, operation: &str, params: Params) -> Result<Option<Destination>> {
        self.in_scope(|| {
            let shortcut = self.shortcut(operation)?;

            self.events.dispatch(&Event::MethodCalled {
                operation,
                params: &params,
            });

            let plugins = self
                .gateway
                .merge_common_plugins(shortcut.plugins(&params));

            self.launch_inner(plugins, params)
                .map(Envelope::into_destination)
        })
    }

    /// Runs `plugins` exactly as given and returns what the run produced.
    pub fn pay(&self, plugins: Vec<PluginEntry>, params: Params) -> Result<Option<Destination>> {
        self.launch(plugins, params).map(Envelope::into_destination)
    }

    /// Like [`Provider::pay`], but hands back the whole envelope.
    pub fn launch(&self, plugins: Vec<PluginEntry>, params: Params) -> Result<Envelope> {
        self.in_scope(|| self.launch_inner(plugins, params))
    }

    /// Lists the steps `call` would run for `operation`, without running them.
    pub fn plan(&self, operation: &str, params: &Params) -> Result<Vec<String>> {
        self.in_scope(|| {
            let shortcut = self.shortcut(operation)?;
            let plugins = self
                .gateway
                .merge_common_plugins(shortcut.plugins(params));
            let steps = self.verify_plugins(&plugins)?;

            Ok(steps.iter().map(|step| step.label().to_string()).collect())
        })
    }

    /// Terminal action of every chain: sends the radar, if any.
    ///
    /// Nothing is sent when a plugin already produced a destination, since
    /// the answer could not be stored.
    pub fn ignite(&self, envelope: Envelope) -> Result<Envelope> {
        self.in_scope(|| self.ignite_inner(envelope))
    }

    fn ignite_inner(&self, mut envelope: Envelope) -> Result<Envelope> {
        let Some(radar) = envelope.radar().cloned() else {
            return Ok(envelope);
        };

        if envelope.destination().is_some() {
            return Err(PayError::invalid_response(
                ResponseErrorCode::DestinationAlreadySet,
                format!(
                    "call through [{}] already has a destination, request not sent",
                    self.gateway.name()
                ),
            ));
        }

        let transport = self.transport.as_ref().ok_or_else(|| {
            PayError::invalid_config(
                ConfigErrorCode::HttpClientMissing,
                format!(
                    "provider [{}] has no transport to send the request with",
                    self.gateway.name()
                ),
            )
        })?;

        info!(
            gateway = self.gateway.name(),
            method = %radar.method,
            url = %radar.url,
            envelope = %envelope.to_diagnostic(),
            "requesting gateway API"
        );
        self.events.dispatch(&Event::ApiRequesting(&envelope));

        let response = match transport.send(&radar) {
            Ok(response) => response,
            Err(e) => {
                error!(
                    gateway = self.gateway.name(),
                    error = %e,
                    envelope = %envelope.to_diagnostic(),
                    "gateway API request failed"
                );
                return Err(PayError::invalid_response(
                    ResponseErrorCode::RequestResponseError,
                    e.to_string(),
                ));
            }
        };

        info!(
            gateway = self.gateway.name(),
            status = response.status,
            "gateway API responded"
        );
        envelope.set_destination(Destination::Response(response))?;
        self.events.dispatch(&Event::ApiRequested(&envelope));

        Ok(envelope)
    }

    fn launch_inner(&self, plugins: Vec<PluginEntry>, params: Params) -> Result<Envelope> {
        let steps = self.verify_plugins(&plugins)?;
        let labels: Vec<String> = steps.iter().map(|s| s.label().to_string()).collect();

        info!(
            gateway = self.gateway.name(),
            plugins = ?labels,
            "starting payment operation"
        );
        self.events.dispatch(&Event::PayStarted {
            plugins: &labels,
            params: &params,
        });

        let envelope = Pipeline::through(&steps).then(Envelope::new(params), |envelope| {
            self.ignite_inner(envelope)
        })?;

        self.events.dispatch(&Event::PayFinished(&envelope));

        Ok(envelope)
    }

    fn shortcut(&self, operation: &str) -> Result<Arc<dyn Shortcut>> {
        self.resolver.shortcut(operation).ok_or_else(|| {
            PayError::invalid_params(
                ParamsErrorCode::ShortcutNotFound,
                format!("[{operation}] is not a known shortcut"),
            )
        })
    }

    /// Checks the whole list before anything runs.
    fn verify_plugins(&self, plugins: &[PluginEntry]) -> Result<Vec<Step>> {
        plugins
            .iter()
            .map(|entry| match entry {
                PluginEntry::Direct { label, step } => Ok(Step::Direct {
                    label: label.clone(),
                    step: step.clone(),
                }),
                PluginEntry::Instance(plugin) => Ok(Step::Named(plugin.clone())),
                PluginEntry::Named(id) => self.resolver.plugin(id).map(Step::Named).ok_or_else(|| {
                    PayError::invalid_params(
                        ParamsErrorCode::PluginIncompatible,
                        format!("[{id}] is not a compatible plugin"),
                    )
                }),
            })
            .collect()
    }

    fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.logger {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}
