use std::sync::LazyLock;

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, TextEncoder};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

// --- Global metrics registered with the default prometheus registry ---

static RECONCILIATIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "fleet_operator_reconciliations_total",
            "Total number of ServiceFleet reconciliations",
        ),
        &["result"],
    )
    .expect("metric can be created");
    prometheus::register(Box::new(counter.clone())).expect("metric can be registered");
    counter
});

static RECONCILE_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    let hist = Histogram::with_opts(HistogramOpts::new(
        "fleet_operator_reconciliation_duration_seconds",
        "Duration of ServiceFleet reconciliation in seconds",
    ))
    .expect("metric can be created");
    prometheus::register(Box::new(hist.clone())).expect("metric can be registered");
    hist
});

static OBJECT_WRITES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "fleet_operator_object_writes_total",
            "Writes to managed objects by kind and operation",
        ),
        &["kind", "operation"],
    )
    .expect("metric can be created");
    prometheus::register(Box::new(counter.clone())).expect("metric can be registered");
    counter
});

/// Record a completed reconciliation ("success" or "error").
pub fn record_reconciliation(result: &str) {
    RECONCILIATIONS.with_label_values(&[result]).inc();
}

/// Observe reconciliation duration.
pub fn observe_reconcile_duration(duration_secs: f64) {
    RECONCILE_DURATION.observe(duration_secs);
}

/// Record a create or replace of a managed object.
pub fn record_object_write(kind: &str, operation: &str) {
    OBJECT_WRITES.with_label_values(&[kind, operation]).inc();
}

/// Encode all registered metrics as Prometheus text format.
fn encode_metrics() -> Result<Vec<u8>, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("Failed to encode metrics: {e}"))?;
    Ok(buffer)
}

/// A fully buffered reply to one scrape or health request.
#[derive(Debug, PartialEq)]
struct Response {
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Response {
    fn text(status: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.content_type,
            self.body.len()
        )
        .into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// Method and path from the request line. Missing parts read as empty.
fn request_target(request: &str) -> (&str, &str) {
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");
    // Query strings are ignored by every endpoint.
    let path = path.split('?').next().unwrap_or(path);
    (method, path)
}

fn route(method: &str, path: &str) -> Response {
    if method != "GET" {
        return Response::text("405 Method Not Allowed", "method not allowed");
    }
    match path {
        "/metrics" => match encode_metrics() {
            Ok(body) => Response {
                status: "200 OK",
                content_type: "text/plain; version=0.0.4; charset=utf-8",
                body,
            },
            Err(e) => Response::text("500 Internal Server Error", &e),
        },
        "/healthz" | "/readyz" => Response::text("200 OK", "ok"),
        _ => Response::text("404 Not Found", "not found"),
    }
}

/// Answer a single request on `stream` and close it.
async fn handle_connection<S>(mut stream: S) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0u8; 2048];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]);
    let (method, path) = request_target(&request);
    let response = route(method, path);
    debug!(method, path, status = response.status, "Metrics request");
    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await
}

/// Start the metrics and health HTTP server.
///
/// Serves `GET /metrics`, `GET /healthz` and `GET /readyz`. Returns only if
/// the listener cannot be bound.
pub async fn serve(addr: String) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!("Metrics server listening on {addr}");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to accept metrics connection: {e}");
                continue;
            }
        };
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream).await {
                debug!(%peer, "Metrics connection closed with error: {e}");
            }
        });
    }
}
