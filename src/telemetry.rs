use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_FILTER: &str = "animal_classifier=info,actix_web=info";
const CLIENT_FILTER: &str = "animal_classifier=warn,classify=warn";

/// Installs the server subscriber on stdout. `RUST_LOG` overrides the default
/// filter and `LOG_FORMAT=json` switches to JSON lines.
///
/// actix's `Logger` middleware writes through `log`; the subscriber picks those
/// records up as well.
pub fn init() {
    install(SERVER_FILTER, std::io::stdout);
}

/// Client variant: quieter and on stderr so the chart owns stdout.
pub fn init_client() {
    install(CLIENT_FILTER, std::io::stderr);
}

fn install<W>(default_filter: &str, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if use_json {
        registry.with(fmt::layer().json().with_writer(writer)).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(writer))
            .init();
    }
}
