//! Plugin service process
//!
//! Serves the router on the Docker plugin socket and, when configured, on a
//! TCP address for the admin CLI. Both listeners stop on a shared
//! [`ShutdownHandle`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use crate::backend::ensure_root;
use crate::http_server;
use crate::{ServiceConfig, ServiceState};

/// Shutdown signal shared by every listener of a service.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`ShutdownHandle::shutdown`] has been called.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives in self, so this only ends on a value change
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A started service. Call [`RunningService::stop`] to shut it down cleanly.
#[derive(Debug)]
pub struct RunningService {
    state: ServiceState,
    shutdown: ShutdownHandle,
    socket_path: PathBuf,
    api_addr: Option<SocketAddr>,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningService {
    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Address the admin listener is bound to, if any.
    pub fn api_addr(&self) -> Option<SocketAddr> {
        self.api_addr
    }

    /// Stop both listeners, remove the socket file and report volumes that
    /// are still mounted.
    pub async fn stop(self) {
        self.shutdown.shutdown();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "listener task ended abnormally");
            }
        }

        match tokio::fs::remove_file(&self.socket_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(socket = %self.socket_path.display(), error = %e, "failed to remove plugin socket")
            }
        }

        for info in self.state.registry().snapshot().await {
            if info.bound {
                tracing::warn!(
                    volume = %info.name,
                    mountpoint = %info.mountpoint.display(),
                    ref_count = info.ref_count,
                    "volume still mounted at shutdown"
                );
            }
        }
        tracing::info!("minfs plugin stopped");
    }
}

/// Bind the listeners for `state` and start serving in the background.
pub async fn start_service(
    config: &ServiceConfig,
    state: ServiceState,
) -> anyhow::Result<RunningService> {
    ensure_root(&config.mount_root)
        .await
        .with_context(|| format!("preparing mount root {}", config.mount_root.display()))?;

    let shutdown = ShutdownHandle::new();
    let router = http_server::router(state.clone());
    let mut tasks = Vec::new();

    let unix_listener = bind_socket(&config.socket_path).await?;
    tracing::info!(socket = %config.socket_path.display(), "serving plugin API");
    tasks.push(tokio::spawn(serve_unix(
        unix_listener,
        router.clone(),
        shutdown.clone(),
    )));

    let api_addr = match config.api_listen_addr {
        Some(addr) => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding admin API on {addr}"))?;
            let local_addr = listener.local_addr()?;
            tracing::info!(addr = %local_addr, "serving admin API");
            let shutdown = shutdown.clone();
            tasks.push(tokio::spawn(async move {
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(async move { shutdown.wait().await })
                    .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "admin API server failed");
                }
            }));
            Some(local_addr)
        }
        None => None,
    };

    Ok(RunningService {
        state,
        shutdown,
        socket_path: config.socket_path.clone(),
        api_addr,
        tasks,
    })
}

/// Run the plugin until Ctrl-C or SIGTERM.
pub async fn spawn_service(config: &ServiceConfig) -> anyhow::Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mount_root = %config.mount_root.display(),
        provision_buckets = config.provision_buckets,
        "starting minfs plugin"
    );

    let state = ServiceState::from_config(config);
    let service = start_service(config, state).await?;

    let handle = service.shutdown_handle();
    tokio::select! {
        _ = shutdown_signal() => tracing::info!("shutdown signal received"),
        _ = handle.wait() => {}
    }

    service.stop().await;
    Ok(())
}

async fn bind_socket(path: &Path) -> anyhow::Result<UnixListener> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating socket directory {}", parent.display()))?;
    }
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(socket = %path.display(), "removed stale socket"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("removing stale socket {}", path.display()))
        }
    }
    UnixListener::bind(path).with_context(|| format!("binding plugin socket {}", path.display()))
}

async fn serve_unix(listener: UnixListener, router: Router, shutdown: ShutdownHandle) {
    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to accept plugin connection");
                    continue;
                }
            },
            _ = shutdown.wait() => break,
        };

        let router = router.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let router = router.clone();
                async move { router.oneshot(req).await }
            });

            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::debug!(error = %e, "plugin connection closed with error");
            }
        });
    }
    tracing::debug!("plugin socket listener stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
