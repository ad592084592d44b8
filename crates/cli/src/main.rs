use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use encore_db::{DataStore, PgStore};
use encore_events::{EventBus, NotificationWriter};
use encore_session::{
    FileContextStore, PointsRecalculator, RecordingNavigator, ResolveOptions, SessionAuth,
    SessionConfig, StoreInviteAcceptor, StudioContextRouter,
};

mod args;

use args::{Args, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "encore=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // --- Configuration ---
    let config = SessionConfig::from_env();
    tracing::debug!(
        context_store = %config.context_store_path.display(),
        home = %config.targets.home,
        "Loaded session configuration"
    );

    // --- Database ---
    let store: Arc<dyn DataStore> = Arc::new(
        PgStore::connect(&args.database_url)
            .await
            .context("Failed to connect to database")?,
    );
    tracing::debug!("Database connection pool created");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let writer_handle = tokio::spawn(NotificationWriter::run(
        Arc::clone(&store),
        event_bus.subscribe(),
    ));

    let output = run(&args, &config, store, Arc::clone(&event_bus)).await;

    // Dropping the last bus handle closes the channel so the writer drains
    // pending notifications and exits.
    drop(event_bus);
    if let Err(e) = writer_handle.await {
        tracing::error!(error = %e, "Notification writer panicked");
    }

    println!("{}", serde_json::to_string_pretty(&output?)?);
    Ok(())
}

async fn run(
    args: &Args,
    config: &SessionConfig,
    store: Arc<dyn DataStore>,
    bus: Arc<EventBus>,
) -> anyhow::Result<Value> {
    let output = match &args.command {
        Command::Recalculate { user } => {
            let Some(user_id) = user.as_deref().or(args.user.as_deref()) else {
                bail!("recalculate needs a user: pass --for or --user");
            };
            let summary = PointsRecalculator::new(store)
                .with_events(bus)
                .recalculate(user_id)
                .await?;
            return Ok(serde_json::to_value(summary)?);
        }
        Command::ValidateInvite { token } => {
            let session = Session::open(args, config, store, bus)?;
            return Ok(match session.invites.validate_and_stash(token).await {
                Ok(pending) => json!({
                    "status": "stored",
                    "studio_id": pending.studio_id,
                    "email": pending.email,
                    "role_hint": pending.role_hint,
                }),
                Err(reason) => json!({ "status": "rejected", "reason": reason }),
            });
        }
        Command::Resolve { no_redirect_home } => {
            let session = Session::open(args, config, store, bus)?;
            let options = ResolveOptions {
                redirect_home: !no_redirect_home,
            };
            session.report(serde_json::to_value(session.router.resolve(options).await)?)
        }
        Command::SelectStudio { studio_id } => {
            let session = Session::open(args, config, store, bus)?;
            session.report(serde_json::to_value(
                session.router.select_studio(studio_id).await,
            )?)
        }
        Command::Roles => {
            let session = Session::open(args, config, store, bus)?;
            serde_json::to_value(session.router.active_studio_roles().await?)?
        }
        Command::RequireRole { roles, no_redirect } => {
            let session = Session::open(args, config, store, bus)?;
            let required: Vec<&str> = roles.iter().map(String::as_str).collect();
            let check = session.router.require_any_role(&required, !no_redirect).await;
            session.report(serde_json::to_value(check)?)
        }
        Command::Logout => {
            let session = Session::open(args, config, store, bus)?;
            session.router.logout()?;
            json!({ "status": "logged_out" })
        }
    };
    Ok(output)
}

/// One page-shell session backed by the on-disk context store.
struct Session {
    router: StudioContextRouter,
    invites: Arc<StoreInviteAcceptor>,
    navigator: Arc<RecordingNavigator>,
}

impl Session {
    fn open(
        args: &Args,
        config: &SessionConfig,
        store: Arc<dyn DataStore>,
        bus: Arc<EventBus>,
    ) -> anyhow::Result<Self> {
        let path = &config.context_store_path;
        let context = Arc::new(
            FileContextStore::open(path)
                .with_context(|| format!("Failed to open context store at {}", path.display()))?,
        );
        let auth = Arc::new(SessionAuth::new(args.user.clone()));
        let navigator = Arc::new(RecordingNavigator::new(args.page.clone()));
        let invites = Arc::new(StoreInviteAcceptor::new(
            Arc::clone(&store),
            context.clone(),
        ));
        let router = StudioContextRouter::new(
            auth,
            store,
            context,
            invites.clone(),
            navigator.clone(),
        )
        .with_targets(config.targets.clone())
        .with_events(bus);

        Ok(Self {
            router,
            invites,
            navigator,
        })
    }

    /// Add the page navigated to, if any, to a JSON report.
    fn report(&self, mut output: Value) -> Value {
        let history = self.navigator.history();
        if let (Value::Object(map), Some(page)) = (&mut output, history.last()) {
            map.insert("navigate_to".into(), json!(page));
        }
        output
    }
}
