use std::io::{self, BufRead, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Instant;

use aris_engine::{AssessmentOutcome, RiskEngine, SensorReading, SeverityTier, SiteEnvironment};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::metrics::MetricsRegistry;
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR,
};

const DEFAULT_MCP_PROTOCOL_VERSION: &str = "2024-11-05";
/// Upper bound for an http body or a framed stdio message.
const MAX_BODY_BYTES: usize = 1 << 20;

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// `aris_assess` arguments. Omitted readings fall back to the nominal pump;
/// an omitted corrosion score falls back to the site preset when a site is
/// given.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AssessInput {
    #[serde(default)]
    asset_id: Option<String>,
    #[serde(default)]
    site: Option<SiteEnvironment>,
    #[serde(default)]
    vibration: Option<f64>,
    #[serde(default)]
    bearing_temp: Option<f64>,
    #[serde(default)]
    corrosion_score: Option<f64>,
    #[serde(default)]
    vibration_change_rate: Option<f64>,
    #[serde(default)]
    flow_rate: Option<f64>,
    #[serde(default)]
    lube_health: Option<f64>,
    #[serde(default)]
    tensile_stress: Option<f64>,
    #[serde(default)]
    remaining_life: Option<f64>,
}

impl AssessInput {
    fn reading(&self) -> SensorReading {
        let nominal = SensorReading::default();
        let corrosion_score = self.corrosion_score.unwrap_or_else(|| {
            self.site
                .map_or(nominal.corrosion_score, SiteEnvironment::default_corrosion_score)
        });
        SensorReading {
            vibration: self.vibration.unwrap_or(nominal.vibration),
            bearing_temp: self.bearing_temp.unwrap_or(nominal.bearing_temp),
            corrosion_score,
            vibration_change_rate: self
                .vibration_change_rate
                .unwrap_or(nominal.vibration_change_rate),
            flow_rate: self.flow_rate.unwrap_or(nominal.flow_rate),
            lube_health: self.lube_health.unwrap_or(nominal.lube_health),
            tensile_stress: self.tensile_stress.unwrap_or(nominal.tensile_stress),
            remaining_life: self.remaining_life.unwrap_or(nominal.remaining_life),
        }
    }
}

pub struct ArisServer {
    engine: RiskEngine,
    metrics: Mutex<MetricsRegistry>,
}

impl ArisServer {
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_engine(RiskEngine::load(config.classifier.clone()))
    }

    pub fn with_engine(engine: RiskEngine) -> Self {
        Self {
            engine,
            metrics: Mutex::new(MetricsRegistry::default()),
        }
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        let is_notification = request.id.is_none();
        let id = request.id.clone().unwrap_or(Value::Null);

        if is_notification && request.method.starts_with("notifications/") {
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MCP_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {"name": "arisd", "version": env!("CARGO_PKG_VERSION")},
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            }
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found"),
        };

        Some(response)
    }

    pub fn render_metrics_text(&self) -> String {
        self.metrics.lock().render_text(self.engine.is_available())
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };

        let start = Instant::now();
        let response = match parsed.name.as_str() {
            "aris_assess" => self.exec_assess(id, parsed.arguments),
            "aris_status" => self.exec_status(id),
            "aris_tiers" => exec_tiers(id),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "unknown tool"),
        };
        self.metrics.lock().record_tool(
            &parsed.name,
            start.elapsed().as_secs_f64() * 1000.0,
            response.is_error(),
        );
        response
    }

    fn exec_assess(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: AssessInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(err) => return with_id(err, id),
        };
        let reading = args.reading();

        let rejected = reading.out_of_range_fields();
        if !rejected.is_empty() {
            self.metrics.lock().record_rejected_reading();
            let detail = rejected
                .iter()
                .map(|field| {
                    let (min, max) = field.documented_range();
                    format!("{} must be within [{min}, {max}]", field.as_str())
                })
                .collect::<Vec<_>>()
                .join("; ");
            debug!(asset_id = ?args.asset_id, %detail, "rejected reading");
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("reading out of range: {detail}"),
            );
        }

        let outcome = self.engine.compute_risk(&reading);
        self.metrics.lock().record_outcome(&outcome);

        let text = render_outcome_text(args.asset_id.as_deref(), &outcome);
        let structured = match serde_json::to_value(&outcome) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(
                    id,
                    INTERNAL_ERROR,
                    format!("failed to serialize outcome: {err}"),
                )
            }
        };
        JsonRpcResponse::tool_result(
            id,
            text,
            json!({
                "asset_id": args.asset_id,
                "site": args.site,
                "reading": reading,
                "outcome": structured
            }),
        )
    }

    fn exec_status(&self, id: Value) -> JsonRpcResponse {
        let available = self.engine.is_available();
        let assessed = self.metrics.lock().assessed_total();
        let text = if available {
            match self.engine.model_id() {
                Some(model) => format!(
                    "ARIS engine ready (classifier: {}, model: {model}).",
                    self.engine.classifier_name().unwrap_or("unknown")
                ),
                None => format!(
                    "ARIS engine ready (classifier: {}).",
                    self.engine.classifier_name().unwrap_or("unknown")
                ),
            }
        } else {
            format!(
                "ARIS engine degraded: {}.",
                self.engine.unavailable_detail().unwrap_or("unknown reason")
            )
        };
        JsonRpcResponse::tool_result(
            id,
            text,
            json!({
                "available": available,
                "classifier": self.engine.classifier_name(),
                "model": self.engine.model_id(),
                "reason": self.engine.unavailable_detail(),
                "assessed_total": assessed
            }),
        )
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut reader = io::BufReader::new(stdin.lock());
        let mut stdout = io::stdout();
        let mut line = String::new();
        info!(available = self.engine.is_available(), "arisd serving on stdio");

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']).trim_start();
            if trimmed.is_empty() {
                continue;
            }

            let (payload, frame) = if is_stdio_header_line(trimmed) {
                let content_length = match read_stdio_content_length(&mut reader, trimmed) {
                    Ok(v) => v,
                    Err(err) => {
                        let response = JsonRpcResponse::error(
                            Value::Null,
                            PARSE_ERROR,
                            format!("invalid stdio frame: {err}"),
                        );
                        write_stdio_response(&mut stdout, &response, StdioFrame::ContentLength)?;
                        continue;
                    }
                };

                let mut body = vec![0_u8; content_length];
                if let Err(err) = reader.read_exact(&mut body) {
                    let response = JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("invalid stdio frame body: {err}"),
                    );
                    write_stdio_response(&mut stdout, &response, StdioFrame::ContentLength)?;
                    continue;
                }
                (body, StdioFrame::ContentLength)
            } else {
                (trimmed.as_bytes().to_vec(), StdioFrame::LineDelimited)
            };

            let request: JsonRpcRequest = match serde_json::from_slice(&payload) {
                Ok(v) => v,
                Err(err) => {
                    let response = JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("parse error: {err}"),
                    );
                    write_stdio_response(&mut stdout, &response, frame)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_stdio_response(&mut stdout, &response, frame)?;
            }
        }

        info!("stdin closed, arisd exiting");
        Ok(())
    }

    pub fn serve_http(&self, addr: &str) -> io::Result<()> {
        let listener = TcpListener::bind(addr)?;
        info!(
            addr = %listener.local_addr()?,
            available = self.engine.is_available(),
            "arisd http listening"
        );
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(err) = self.handle_http_connection(stream) {
                        warn!(error = %err, "http request error");
                    }
                }
                Err(err) => {
                    error!(error = %err, "http accept error");
                }
            }
        }
        Ok(())
    }

    fn handle_http_connection(&self, mut stream: TcpStream) -> io::Result<()> {
        let Some(req) = read_http_request(&stream)? else {
            return Ok(());
        };
        let response = self.dispatch_http_request(&req);
        write_http_response(&mut stream, &response)
    }

    fn dispatch_http_request(&self, req: &HttpRequest) -> HttpResponse {
        match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/health") => HttpResponse::json(
                200,
                &json!({
                    "status": "ok",
                    "engine": if self.engine.is_available() { "ready" } else { "degraded" }
                }),
            ),
            ("GET", "/metrics") => HttpResponse::text(
                200,
                "text/plain; version=0.0.4; charset=utf-8",
                self.render_metrics_text(),
            ),
            ("POST", "/mcp") => self.dispatch_http_rpc(&req.body),
            (_, "/health" | "/metrics" | "/mcp") => HttpResponse::json(
                405,
                &json!({"error":"method_not_allowed","message":"unsupported method for path"}),
            ),
            _ => HttpResponse::json(404, &json!({"error":"not_found","message":"unknown path"})),
        }
    }

    fn dispatch_http_rpc(&self, body: &[u8]) -> HttpResponse {
        let rpc: JsonRpcRequest = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(err) => {
                let response =
                    JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                return HttpResponse::rpc(400, &response);
            }
        };
        match self.handle_request(rpc) {
            Some(response) => HttpResponse::rpc(200, &response),
            None => HttpResponse::empty(202),
        }
    }
}

fn tools_list_result() -> Value {
    json!({
        "tools": [
            {
                "name": "aris_assess",
                "description": "Compute the ARIS risk index, severity tier, contribution shares and alerts for one pump reading.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "asset_id": {"type": "string"},
                        "site": {
                            "type": "string",
                            "enum": ["inland_dry", "coastal_marine", "industrial_chemical", "saline_marine"]
                        },
                        "vibration": {"type": "number", "minimum": 1, "maximum": 25},
                        "bearing_temp": {"type": "number", "minimum": 30, "maximum": 85},
                        "corrosion_score": {"type": "number", "minimum": 0.1, "maximum": 1},
                        "vibration_change_rate": {"type": "number", "minimum": 0, "maximum": 1},
                        "flow_rate": {"type": "number", "minimum": 0.5, "maximum": 1.5},
                        "lube_health": {"type": "number", "minimum": 0, "maximum": 1},
                        "tensile_stress": {"type": "number", "minimum": 0, "maximum": 1},
                        "remaining_life": {"type": "number", "minimum": 0, "maximum": 1}
                    },
                    "additionalProperties": false
                }
            },
            {
                "name": "aris_status",
                "description": "Report whether the failure classifier is loaded and why not if degraded.",
                "inputSchema": {"type": "object", "properties": {}}
            },
            {
                "name": "aris_tiers",
                "description": "List severity tiers with their index bands and recommended actions.",
                "inputSchema": {"type": "object", "properties": {}}
            }
        ]
    })
}

fn exec_tiers(id: Value) -> JsonRpcResponse {
    let tiers: Vec<Value> = SeverityTier::ALL
        .iter()
        .map(|tier| {
            let (min, max) = tier.band();
            json!({
                "tier": tier,
                "min": min,
                "max": max,
                "action": tier.action(),
                "description": tier.action().description()
            })
        })
        .collect();
    let text = SeverityTier::ALL
        .iter()
        .map(|tier| {
            let (min, max) = tier.band();
            format!("{min}-{max}: {tier} ({})", tier.action().description())
        })
        .collect::<Vec<_>>()
        .join("\n");
    JsonRpcResponse::tool_result(id, text, json!({ "tiers": tiers }))
}

fn render_outcome_text(asset_id: Option<&str>, outcome: &AssessmentOutcome) -> String {
    let body = match outcome {
        AssessmentOutcome::Assessed(assessment) => assessment.to_string(),
        AssessmentOutcome::Unavailable(reason) => format!("ARIS index unavailable: {reason}."),
    };
    match asset_id {
        Some(asset) => format!("Asset {asset}\n{body}"),
        None => body,
    }
}

fn with_id(mut response: JsonRpcResponse, id: Value) -> JsonRpcResponse {
    response.id = id;
    response
}

/// Missing arguments are treated as an empty object so every reading field
/// can fall back to its default.
fn parse_args<T: for<'de> Deserialize<'de>>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    let args = arguments.unwrap_or_else(|| json!({}));
    serde_json::from_value(args).map_err(|err| {
        JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            format!("invalid tool arguments: {err}"),
        )
    })
}

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

struct HttpResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl HttpResponse {
    fn json(status: u16, value: &Value) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn rpc(status: u16, response: &JsonRpcResponse) -> Self {
        match serde_json::to_vec(response) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(_) => Self::json(
                500,
                &json!({"error":"internal_error","message":"failed to serialize rpc response"}),
            ),
        }
    }

    fn text(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body: body.into_bytes(),
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: Vec::new(),
        }
    }
}

fn read_http_request(stream: &TcpStream) -> io::Result<Option<HttpRequest>> {
    let mut reader = io::BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let first = line.trim_end_matches(['\r', '\n']);
    if first.is_empty() {
        return Ok(None);
    }

    let mut parts = first.split_whitespace();
    let Some(method) = parts.next() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid http request line (missing method)",
        ));
    };
    let Some(raw_path) = parts.next() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid http request line (missing path)",
        ));
    };
    let path = raw_path.split('?').next().unwrap_or(raw_path).to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        if let Some(v) = parse_content_length(header) {
            content_length = v;
        }
    }
    if content_length > MAX_BODY_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("http body of {content_length} bytes exceeds limit"),
        ));
    }

    let mut body = vec![0_u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body)?;
    }
    Ok(Some(HttpRequest {
        method: method.to_string(),
        path,
        body,
    }))
}

fn write_http_response(stream: &mut TcpStream, response: &HttpResponse) -> io::Result<()> {
    let reason = http_reason_phrase(response.status);
    let headers = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason,
        response.content_type,
        response.body.len()
    );
    stream.write_all(headers.as_bytes())?;
    stream.write_all(&response.body)?;
    stream.flush()
}

fn http_reason_phrase(status: u16) -> &'static str {
    match status {
        202 => "Accepted",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

#[derive(Debug, Clone, Copy)]
enum StdioFrame {
    LineDelimited,
    ContentLength,
}

fn write_stdio_response(
    stdout: &mut io::Stdout,
    response: &JsonRpcResponse,
    frame: StdioFrame,
) -> io::Result<()> {
    match frame {
        StdioFrame::LineDelimited => {
            let serialized = serde_json::to_string(response)?;
            writeln!(stdout, "{serialized}")?;
        }
        StdioFrame::ContentLength => {
            let serialized = serde_json::to_vec(response)?;
            write!(stdout, "Content-Length: {}\r\n\r\n", serialized.len())?;
            stdout.write_all(&serialized)?;
        }
    }
    stdout.flush()
}

fn is_stdio_header_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("content-length:") || lower.starts_with("content-type:")
}

fn read_stdio_content_length<R: BufRead>(reader: &mut R, first_line: &str) -> io::Result<usize> {
    let mut content_length = parse_content_length(first_line);
    let mut header_line = String::new();
    loop {
        header_line.clear();
        if reader.read_line(&mut header_line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected eof while reading frame headers",
            ));
        }
        let trimmed = header_line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some(v) = parse_content_length(trimmed) {
            content_length = Some(v);
        }
    }
    let content_length = content_length.ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "missing content-length header")
    })?;
    if content_length > MAX_BODY_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {content_length} bytes exceeds limit of {MAX_BODY_BYTES}"),
        ));
    }
    Ok(content_length)
}

fn parse_content_length(line: &str) -> Option<usize> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}
