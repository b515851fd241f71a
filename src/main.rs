use actix_cors::Cors;
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;

use rust_school_journal::config::AppConfig;
use rust_school_journal::models::AppStartTime;
use rust_school_journal::routes;
use rust_school_journal::runtime::lifetime;
use rust_school_journal::utils::{json_error_handler, query_error_handler};

/// 开发环境输出带源码位置的文本日志，其他环境输出 JSON
fn init_tracing(config: &AppConfig) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.app.log_level))
        .with_writer(writer)
        .event_format(
            tracing_subscriber::fmt::format()
                .with_level(true)
                .with_ansi(true),
        );

    if config.is_development() {
        builder.with_file(true).with_line_number(true).init();
    } else {
        builder.json().init();
    }
    guard
}

/// 监听目标：配置了 Unix socket 时优先使用
enum ListenTarget {
    #[cfg(unix)]
    Unix(String),
    Tcp(String),
}

fn listen_target(config: &AppConfig) -> std::io::Result<ListenTarget> {
    #[cfg(unix)]
    if let Some(socket_path) = config.unix_socket_path() {
        // 上次运行遗留的 socket 文件会导致绑定失败
        if std::path::Path::new(socket_path).exists() {
            std::fs::remove_file(socket_path)?;
        }
        return Ok(ListenTarget::Unix(socket_path.to_string()));
    }
    Ok(ListenTarget::Tcp(config.server_bind_address()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    setup_panic!();

    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    AppConfig::init().map_err(|e| std::io::Error::other(format!("Failed to load config: {e}")))?;
    let config = AppConfig::get();
    let _log_guard = init_tracing(config);

    warn!(
        "Starting {} ({} v{}, by {})",
        config.app.system_name,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS")
    );

    // 数据库迁移、缓存与默认管理员
    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| std::io::Error::other(e.format_simple()))?;
    let storage = startup.storage;
    let cache = startup.cache;

    debug!(
        "Startup finished in {} ms",
        chrono::Utc::now()
            .signed_duration_since(app_start_time.start_datetime)
            .num_milliseconds()
    );
    warn!("Using {} worker(s)", config.server.workers);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(config.cors.max_age),
            )
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add((
                        "Keep-Alive",
                        format!("timeout={}, max=1000", config.server.timeouts.keep_alive),
                    ))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            // 参数错误统一返回 400 信封
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PayloadConfig::new(config.server.limits.max_payload_size))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(cache.clone()))
            .configure(routes::configure_api)
    })
    .keep_alive(Duration::from_secs(config.server.timeouts.keep_alive))
    .client_request_timeout(Duration::from_millis(config.server.timeouts.client_request))
    .client_disconnect_timeout(Duration::from_millis(
        config.server.timeouts.client_disconnect,
    ))
    .workers(config.server.workers);

    let server = match listen_target(config)? {
        #[cfg(unix)]
        ListenTarget::Unix(socket_path) => {
            warn!("Starting server on Unix socket: {}", socket_path);
            server.bind_uds(socket_path)?
        }
        ListenTarget::Tcp(bind_address) => {
            warn!("Starting server at http://{}", bind_address);
            server.bind(bind_address)?
        }
    }
    .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
