use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    middleware::{ErrorHandlers, Logger},
    web, App, HttpServer,
};
use context::ApiRestCtx;
use error_handler::default_error_handler;
use logger::logger_format;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use configure::configure;

mod configure;
pub mod context;
pub mod error_handler;
mod logger;
mod model;
mod service;
mod util;

pub struct ApiRestServer {
    address: String,
    allowed_origin: Option<String>,
    workers: Option<usize>,
    timeout: Duration,
    context: web::Data<ApiRestCtx>,
}

impl ApiRestServer {
    pub fn new(
        host: &str,
        port: &u16,
        allowed_origin: &Option<String>,
        workers: &Option<usize>,
        timeout: &Duration,
        ctx: ApiRestCtx,
    ) -> Self {
        gs_log::info(Some("⚡"), "[ApiRestServer] Initializing component");

        let address = format!("{host}:{port}");
        let context = web::Data::new(ctx);

        Self {
            address,
            allowed_origin: allowed_origin.clone(),
            workers: *workers,
            timeout: *timeout,
            context,
        }
    }

    pub fn run(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        gs_log::info(Some("💫"), "[ApiRestServer] Running component");

        let address = self.address.clone();
        let server = match self.build() {
            Ok(server) => server,
            Err(err) => gs_log::panic(None, format!("[ApiRestServer] Failed to bind {address}: {err}")),
        };

        tokio::spawn((|| async move {
            let server_handle = server.handle();
            let mut server_task = tokio::spawn(server);

            tokio::select! {
                _ = cancel_token.cancelled() => {}
                _ = tokio::signal::ctrl_c() => {}
                res = &mut server_task => {
                    match res {
                        Ok(Err(err)) => gs_log::error(None, format!("[ApiRestServer] Server error: {err}")),
                        Err(err) => gs_log::error(None, format!("[ApiRestServer] Server task failed: {err}")),
                        Ok(Ok(_)) => {}
                    }
                    return;
                }
            }

            gs_log::info(None, "[ApiRestServer] Shutting down component");
            server_handle.stop(true).await;
        })())
    }

    fn build(self) -> std::io::Result<Server> {
        let context = self.context;
        let allowed_origin = self.allowed_origin;

        let mut server = HttpServer::new(move || {
            let cors = match &allowed_origin {
                Some(origin) => Cors::default()
                    .allowed_origin(origin)
                    .allow_any_method()
                    .allow_any_header(),
                None => Cors::permissive(),
            };

            App::new()
                .wrap(cors)
                .wrap(Logger::new(logger_format()))
                .wrap(ErrorHandlers::new().default_handler(default_error_handler))
                .app_data(context.clone())
                .configure(configure)
        })
        .client_request_timeout(self.timeout)
        .disable_signals();
        if let Some(workers) = self.workers {
            server = server.workers(workers);
        }

        Ok(server.bind(&self.address)?.run())
    }
}
