use std::sync::Arc;

use async_nats::jetstream;
use heartbeat_common::nats_config::StreamConfig;
use heartbeat_common::retry::Backoff;
use heartbeat_diagnostics::{
    BaselineEvaluator, BaselineStore, Cooldown, InMemoryBaselineStore, PgBaselineStore,
    ThresholdEvaluator,
};
use heartbeat_notify::{
    Dispatcher, EmailNotifier, InMemoryLiveUpdatePublisher, InMemoryReportStore,
    LiveUpdateNotifier, LiveUpdatePublisher, MailTransport, NatsLiveUpdatePublisher,
    OperatorSessionNotifier, PersistedStoreNotifier, PgReportStore, ReportStore, SessionRegistry,
    SmtpTransport,
};
use crate::api::{self, AgentState};
use crate::clients::{
    HttpBillingClient, HttpJson, HttpMetricsClient, HttpTenantRegistry, OpenAiReasoner,
};
use crate::config::HeartbeatConfig;
use crate::infra::InfraMonitor;
use crate::investigate::Investigator;
use crate::lookout::{create_lookout_consumer, LookoutConsumer, LookoutTrigger};
use crate::messaging::open_event_stream;
use crate::metrics::HeartbeatMetrics;
use crate::observer::LoggingObserver;
use crate::reporter::Reporter;
use crate::scheduler::{Agent, AgentDeps, AgentSettings};
use crate::storage::open_database;
use crate::usage::{InMemoryUsageSink, NatsUsageSink, UsageSink};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DB_MAX_CONNECTIONS: u32 = 5;

struct Stores {
    baselines: Arc<dyn BaselineStore>,
    reports: Arc<dyn ReportStore>,
}

struct Publishers {
    live: Arc<dyn LiveUpdatePublisher>,
    usage: Arc<dyn UsageSink>,
    jetstream: Option<jetstream::Context>,
}

pub async fn run(config: HeartbeatConfig) -> Result<(), BoxError> {
    tracing::info!(
        interval_s = config.interval_seconds,
        window_s = config.window_seconds,
        required_tier = config.required_tier_level,
        "heartbeat agent configured"
    );

    let timeout = config.http_timeout();
    let token = config.endpoints.service_token.clone();
    let metrics_client = Arc::new(HttpMetricsClient::new(HttpJson::new(
        &config.endpoints.metrics_url,
        token.clone(),
        timeout,
    )?));
    let billing = Arc::new(HttpBillingClient::new(HttpJson::new(
        &config.endpoints.billing_url,
        token.clone(),
        timeout,
    )?));
    let registry = Arc::new(HttpTenantRegistry::new(HttpJson::new(
        &config.endpoints.registry_url,
        token,
        timeout,
    )?));
    let reasoner = Arc::new(OpenAiReasoner::new(
        HttpJson::new(&config.llm.base_url, config.llm.api_key.clone(), timeout)?,
        config.llm.model.clone(),
    ));

    let stores = open_stores(&config).await?;
    let publishers = open_publishers(&config).await?;

    let mailer: Option<Arc<dyn MailTransport>> = if config.smtp.is_configured() {
        Some(Arc::new(SmtpTransport::new(&config.smtp)?))
    } else {
        tracing::warn!("SMTP not configured, email delivery disabled");
        None
    };
    let email = match &mailer {
        Some(transport) => EmailNotifier::with_transport(transport.clone()),
        None => EmailNotifier::from_config(&config.smtp)?,
    };

    let sessions = SessionRegistry::new();
    let dispatcher = Dispatcher::new()
        .with_channel(Arc::new(PersistedStoreNotifier::new(stores.reports.clone())))
        .with_channel(Arc::new(OperatorSessionNotifier::new(sessions)))
        .with_channel(Arc::new(LiveUpdateNotifier::new(publishers.live.clone())))
        .with_channel(Arc::new(email));
    tracing::info!(channels = ?dispatcher.channel_names(), "notification fan-out ready");

    let reporter = Reporter::new(
        billing.clone(),
        dispatcher,
        config.webapp_url.clone(),
        config.notifications.clone(),
    );
    let evaluator = BaselineEvaluator::new(
        stores.baselines.clone(),
        config.baseline.sigma_limit,
        config.baseline.min_samples,
    );

    let infra = if config.infra.enabled {
        Some(InfraMonitor::new(
            registry.clone(),
            metrics_client.clone(),
            billing.clone(),
            evaluator.clone(),
            mailer,
            std::time::Duration::from_secs(config.infra.cooldown_seconds),
        ))
    } else {
        None
    };

    let state = AgentState::new(HeartbeatMetrics::new());
    api::spawn(config.api_addr.clone(), state.clone());

    let agent = Arc::new(Agent::new(
        AgentSettings::from_config(&config),
        AgentDeps {
            registry,
            billing,
            metrics: metrics_client,
            evaluator,
            thresholds: ThresholdEvaluator::new(config.thresholds.clone()),
            cooldown: Cooldown::new(config.flag_cooldown()),
            investigator: Investigator::new(reasoner),
            usage: publishers.usage,
            reporter,
            observer: Arc::new(LoggingObserver),
            infra,
            state,
        },
    ));

    let (tx, rx) = crate::shutdown::shutdown_channel();
    crate::shutdown::spawn_signal_listener(tx);

    match &publishers.jetstream {
        Some(js) if config.lookout.enabled => {
            let consumer = create_lookout_consumer(js, &config.lookout).await?;
            let lookout = LookoutConsumer::new(
                consumer,
                LookoutTrigger::new(agent.clone()),
                config.lookout.batch_size,
            );
            let shutdown = rx.clone();
            tokio::spawn(async move { lookout.run(shutdown).await });
        }
        Some(_) => tracing::info!("lookout trigger disabled"),
        None => tracing::warn!("no nats_url, lookout incidents are not consumed"),
    }

    agent.run(rx).await;
    tracing::info!("heartbeat agent stopped");
    Ok(())
}

async fn open_stores(config: &HeartbeatConfig) -> Result<Stores, BoxError> {
    let Some(url) = config.database_url.as_deref().filter(|u| !u.is_empty()) else {
        tracing::warn!("no database_url, baselines and reports are kept in memory");
        return Ok(Stores {
            baselines: Arc::new(InMemoryBaselineStore::new()),
            reports: Arc::new(InMemoryReportStore::new()),
        });
    };

    let pool = open_database(url, DB_MAX_CONNECTIONS, &Backoff::default()).await?;

    Ok(Stores {
        baselines: Arc::new(PgBaselineStore::new(pool.clone())),
        reports: Arc::new(PgReportStore::new(pool)),
    })
}

async fn open_publishers(config: &HeartbeatConfig) -> Result<Publishers, BoxError> {
    let Some(url) = config.nats_url.as_deref().filter(|u| !u.is_empty()) else {
        tracing::warn!("no nats_url, live updates and usage events stay in process");
        return Ok(Publishers {
            live: Arc::new(InMemoryLiveUpdatePublisher::new()),
            usage: Arc::new(InMemoryUsageSink::new()),
            jetstream: None,
        });
    };

    tracing::info!(url = %url, "connecting to NATS JetStream");
    let js = open_event_stream(url, &StreamConfig::default(), &Backoff::default()).await?;

    Ok(Publishers {
        live: Arc::new(NatsLiveUpdatePublisher::new(js.clone())),
        usage: Arc::new(NatsUsageSink::new(js.clone())),
        jetstream: Some(js),
    })
}
