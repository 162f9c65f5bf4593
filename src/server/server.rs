use crate::config::FingerprintConfig;
use crate::core::FingerprintService;
use crate::device::SerialSource;
use crate::error::{FingerprintError, Result};
use crate::model::{ErrorBody, Fingerprint, SerialNumber};
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[cfg(feature = "https")]
use axum_server::tls_rustls::RustlsConfig;

#[cfg(feature = "https")]
const BIND_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Shared by every request handler
pub struct ServerState {
    service: Arc<FingerprintService>,
    serial: Arc<dyn SerialSource>,
    config: FingerprintConfig,
}

impl ServerState {
    pub fn new(
        service: Arc<FingerprintService>,
        serial: Arc<dyn SerialSource>,
        config: FingerprintConfig,
    ) -> Self {
        Self {
            service,
            serial,
            config,
        }
    }
}

pub struct FingerprintServer {
    port: u16,
    https: bool,
    state: Arc<ServerState>,
    local_addr: Option<SocketAddr>,
    handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    #[cfg(feature = "https")]
    tls_cert: Option<crate::crypto::TlsCertificate>,
}

impl FingerprintServer {
    pub fn new(state: ServerState, port: u16, https: bool) -> Self {
        Self {
            port,
            https,
            state: Arc::new(state),
            local_addr: None,
            handle: None,
            shutdown_tx: None,
            #[cfg(feature = "https")]
            tls_cert: None,
        }
    }

    #[cfg(feature = "https")]
    pub fn set_tls_certificate(&mut self, cert: crate::crypto::TlsCertificate) {
        self.tls_cert = Some(cert);
    }

    /// Address the server is listening on, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub async fn start(&mut self) -> Result<()> {
        let router = router(self.state.clone());

        let addr = format!("0.0.0.0:{}", self.port);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        if self.https {
            #[cfg(feature = "https")]
            {
                let (cert_pem, key_pem) = match self.tls_cert {
                    Some(ref cert) => (cert.cert_pem.clone(), cert.key_pem.clone()),
                    None => {
                        let cert = crate::crypto::generate_tls_certificate(&["localhost"])?;
                        (cert.cert_pem, cert.key_pem)
                    }
                };

                let tls_config =
                    RustlsConfig::from_pem(cert_pem.into_bytes(), key_pem.into_bytes())
                        .await
                        .map_err(|e| {
                            FingerprintError::network(format!("Failed to create TLS config: {}", e))
                        })?;

                let socket_addr: SocketAddr = addr.parse().map_err(|e| {
                    FingerprintError::network(format!("Failed to parse address: {}", e))
                })?;

                let server_handle: axum_server::Handle<SocketAddr> = axum_server::Handle::new();
                let listening = server_handle.clone();

                let handle = tokio::spawn(async move {
                    let server = axum_server::bind_rustls(socket_addr, tls_config)
                        .handle(server_handle)
                        .serve(router.into_make_service());

                    tokio::select! {
                        result = server => {
                            if let Err(e) = result {
                                tracing::error!("HTTPS server stopped: {}", e);
                            }
                        },
                        _ = shutdown_rx => {},
                    }
                });

                let bound = tokio::time::timeout(BIND_TIMEOUT, listening.listening())
                    .await
                    .ok()
                    .flatten();
                let Some(bound) = bound else {
                    handle.abort();
                    return Err(FingerprintError::network(format!(
                        "HTTPS server failed to bind {}",
                        socket_addr
                    )));
                };
                self.local_addr = Some(bound);
                let socket_addr = bound;

                self.handle = Some(handle);
                tracing::info!("Serving fingerprint API on https://{}", socket_addr);
                return Ok(());
            }
            #[cfg(not(feature = "https"))]
            {
                return Err(FingerprintError::network(
                    "HTTPS support not enabled. Please build with --features https",
                ));
            }
        } else {
            let listener = TcpListener::bind(&addr).await?;
            let local_addr = listener.local_addr()?;
            self.local_addr = Some(local_addr);

            let handle = tokio::spawn(async move {
                let served = axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
                if let Err(e) = served {
                    tracing::error!("HTTP server stopped: {}", e);
                }
            });

            self.handle = Some(handle);
            tracing::info!("Serving fingerprint API on http://{}", local_addr);
            Ok(())
        }
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for FingerprintServer {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/uuid", get(handle_uuid))
        .route("/api/fingerprint", get(handle_fingerprint))
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody::new(message)))
}

async fn handle_uuid(
    State(state): State<Arc<ServerState>>,
) -> std::result::Result<Json<SerialNumber>, ApiError> {
    match state.serial.read().await {
        Ok(serial) => Ok(Json(serial)),
        Err(FingerprintError::UnsupportedPlatform { platform }) => {
            tracing::debug!("Serial number requested on unsupported platform {}", platform);
            Err(api_error(StatusCode::BAD_REQUEST, "Unsupported platform"))
        }
        Err(e) => {
            tracing::error!("Error retrieving serial number: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error retrieving serial number",
            ))
        }
    }
}

async fn handle_fingerprint(
    State(state): State<Arc<ServerState>>,
) -> std::result::Result<Json<Fingerprint>, ApiError> {
    state
        .service
        .fingerprint(state.config.clone())
        .await
        .map(Json)
        .map_err(|e| {
            tracing::warn!("Fingerprint request failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}
