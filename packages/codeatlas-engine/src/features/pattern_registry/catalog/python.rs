//! Python pattern catalog
//!
//! The dynamically-typed variant: no receivers to lean on, so module paths
//! and naming conventions do the work.

use crate::features::pattern_registry::patterns::{
    EntryPointPattern, FlowPattern, SideEffectCategory, SideEffectPattern,
};

pub fn sources() -> Vec<FlowPattern> {
    vec![
        FlowPattern::source("http_input", "get_json", "request body").in_package("*flask*"),
        FlowPattern::source("http_input", "args", "query parameters").in_package("*flask*"),
        FlowPattern::source("http_input", "form", "form fields").in_package("*flask*"),
        FlowPattern::source("env", "getenv", "environment variable").in_package("os"),
        FlowPattern::source("env", "environ", "environment mapping").in_package("os"),
        FlowPattern::source("file", "read", "file contents").with_confidence(0.5),
        FlowPattern::source("file", "open", "file handle").with_confidence(0.6),
        FlowPattern::source("cli", "argv", "command-line arguments").in_package("sys"),
        FlowPattern::source("cli", "parse_args", "parsed CLI arguments").in_package("argparse"),
        FlowPattern::source("database", "fetchall", "database rows"),
        FlowPattern::source("database", "fetchone", "database row"),
        FlowPattern::source("websocket", "recv", "websocket frame").in_package("*websocket*"),
    ]
}

pub fn sinks() -> Vec<FlowPattern> {
    vec![
        FlowPattern::sink("response", "jsonify", "JSON response").in_package("*flask*"),
        FlowPattern::sink("response", "render_template", "HTML response")
            .in_package("*flask*")
            .dangerous(),
        FlowPattern::sink("database", "execute", "SQL statement").dangerous(),
        FlowPattern::sink("database", "executemany", "SQL batch").dangerous(),
        FlowPattern::sink("sql", "execute", "raw SQL").with_signature("%s").dangerous(),
        FlowPattern::sink("file", "write", "file write").with_confidence(0.6).dangerous(),
        FlowPattern::sink("log", "info", "log record").in_package("logging"),
        FlowPattern::sink("log", "error", "log record").in_package("logging"),
        FlowPattern::sink("log", "print", "stdout output"),
        FlowPattern::sink("network", "get", "outbound HTTP request")
            .in_package("requests")
            .dangerous(),
        FlowPattern::sink("network", "post", "outbound HTTP request")
            .in_package("requests")
            .dangerous(),
        FlowPattern::sink("network", "urlopen", "outbound HTTP request")
            .in_package("*urllib*")
            .dangerous(),
        FlowPattern::sink("command", "run", "subprocess execution")
            .in_package("subprocess")
            .dangerous(),
        FlowPattern::sink("command", "Popen", "subprocess spawn")
            .in_package("subprocess")
            .dangerous(),
        FlowPattern::sink("command", "system", "shell execution").in_package("os").dangerous(),
        FlowPattern::sink("eval", "eval", "dynamic evaluation").dangerous(),
        FlowPattern::sink("eval", "exec", "dynamic execution").dangerous(),
    ]
}

pub fn entry_points() -> Vec<EntryPointPattern> {
    vec![
        EntryPointPattern::new("main", "main", "script entry point"),
        EntryPointPattern::new("handler", "*", "flask route handler")
            .with_signature("@app.route")
            .framework("flask"),
        EntryPointPattern::new("handler", "*", "fastapi route handler")
            .with_signature("@app.")
            .framework("fastapi"),
        EntryPointPattern::new("handler", "*_handler", "request handler by convention"),
        EntryPointPattern::new("command", "*", "click command")
            .with_signature("@click.")
            .framework("click"),
        EntryPointPattern::new("test", "test_*", "pytest test"),
        EntryPointPattern::new("lambda", "lambda_handler", "AWS Lambda handler")
            .framework("aws-lambda"),
        EntryPointPattern::new("grpc", "*", "gRPC servicer method")
            .with_signature("ServicerContext")
            .framework("grpc"),
    ]
}

pub fn side_effects() -> Vec<SideEffectPattern> {
    use SideEffectCategory::*;
    vec![
        SideEffectPattern::new(FileIo, "builtins", "open", "opens a file").idempotent(),
        SideEffectPattern::new(FileIo, "os", "remove", "deletes a file"),
        SideEffectPattern::new(FileIo, "shutil", "rmtree", "deletes a directory tree"),
        SideEffectPattern::new(Network, "requests", "get", "outbound HTTP GET").idempotent(),
        SideEffectPattern::new(Network, "requests", "post", "outbound HTTP POST"),
        SideEffectPattern::new(Database, "sqlite3", "execute", "SQL execution"),
        SideEffectPattern::new(Database, "psycopg2", "execute", "SQL execution"),
        SideEffectPattern::new(Logging, "logging", "info", "log record").idempotent(),
        SideEffectPattern::new(Logging, "logging", "error", "log record").idempotent(),
        SideEffectPattern::new(Logging, "builtins", "print", "stdout output").idempotent(),
        SideEffectPattern::new(GlobalState, "builtins", "setattr", "mutates an object")
            .reversible(),
        SideEffectPattern::new(Process, "sys", "exit", "terminates the process"),
        SideEffectPattern::new(Process, "subprocess", "run", "executes a subprocess"),
        SideEffectPattern::new(Environment, "os", "putenv", "mutates the environment")
            .reversible()
            .idempotent(),
    ]
}
