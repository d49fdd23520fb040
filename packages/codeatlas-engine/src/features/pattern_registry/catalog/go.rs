//! Go pattern catalog
//!
//! The statically-typed-with-packages variant: receivers and package paths
//! carry most of the signal, signatures disambiguate frameworks.

use crate::features::pattern_registry::patterns::{
    EntryPointPattern, FlowPattern, SideEffectCategory, SideEffectPattern,
};

pub fn sources() -> Vec<FlowPattern> {
    vec![
        // HTTP input
        FlowPattern::source("http_input", "FormValue", "form field from the request")
            .on_receiver("*Request"),
        FlowPattern::source("http_input", "Query", "query parameter").on_receiver("*Context"),
        FlowPattern::source("http_input", "Param", "path parameter").on_receiver("*Context"),
        FlowPattern::source("http_input", "Bind*", "request body binding").on_receiver("*Context"),
        FlowPattern::source("http_input", "ShouldBind*", "request body binding")
            .on_receiver("*Context"),
        FlowPattern::source("http_input", "Decode", "request body decoding")
            .with_signature("Decoder"),
        // Environment
        FlowPattern::source("env", "Getenv", "environment variable").in_package("os"),
        FlowPattern::source("env", "LookupEnv", "environment variable").in_package("os"),
        // File input
        FlowPattern::source("file", "ReadFile", "file contents").in_package("os"),
        FlowPattern::source("file", "ReadAll", "stream contents").in_package("io"),
        FlowPattern::source("file", "Open", "file handle").in_package("os").with_confidence(0.6),
        // CLI
        FlowPattern::source("cli", "Args", "command-line arguments").in_package("os"),
        FlowPattern::source("cli", "String", "flag value").in_package("flag"),
        FlowPattern::source("cli", "Parse", "flag parsing").in_package("flag"),
        // Database reads
        FlowPattern::source("database", "Query*", "database rows").in_package("*sql"),
        FlowPattern::source("database", "Scan", "row scan").on_receiver("*Rows"),
        // Websocket
        FlowPattern::source("websocket", "ReadMessage", "websocket frame")
            .in_package("*websocket*"),
        FlowPattern::source("websocket", "ReadJSON", "websocket payload")
            .in_package("*websocket*"),
    ]
}

pub fn sinks() -> Vec<FlowPattern> {
    vec![
        // Response writers
        FlowPattern::sink("response", "Write", "raw response body").on_receiver("*ResponseWriter"),
        FlowPattern::sink("response", "JSON", "JSON response").on_receiver("*Context"),
        FlowPattern::sink("response", "String", "text response").on_receiver("*Context"),
        FlowPattern::sink("response", "HTML", "HTML response").on_receiver("*Context").dangerous(),
        // Database writes
        FlowPattern::sink("database", "Exec*", "database mutation").in_package("*sql").dangerous(),
        FlowPattern::sink("sql", "Query*", "SQL query construction")
            .in_package("*sql")
            .with_signature("string")
            .dangerous(),
        // Filesystem
        FlowPattern::sink("file", "WriteFile", "file write").in_package("os").dangerous(),
        FlowPattern::sink("file", "Create", "file creation").in_package("os").dangerous(),
        FlowPattern::sink("file", "Remove*", "file deletion").in_package("os").dangerous(),
        // Logging
        FlowPattern::sink("log", "Print*", "log output").in_package("log"),
        FlowPattern::sink("log", "Fatal*", "log + exit").in_package("log"),
        FlowPattern::sink("log", "Info*", "structured log").in_package("*slog"),
        FlowPattern::sink("log", "Error*", "structured log").in_package("*slog"),
        // Outbound network
        FlowPattern::sink("network", "Get", "outbound HTTP request")
            .in_package("net/http")
            .dangerous(),
        FlowPattern::sink("network", "Post", "outbound HTTP request")
            .in_package("net/http")
            .dangerous(),
        FlowPattern::sink("network", "PostForm", "outbound HTTP request")
            .in_package("net/http")
            .dangerous(),
        FlowPattern::sink("network", "Do", "outbound HTTP request")
            .on_receiver("*Client")
            .dangerous(),
        FlowPattern::sink("network", "Dial*", "raw network connection")
            .in_package("net")
            .dangerous(),
        // Process execution
        FlowPattern::sink("command", "Command", "subprocess construction")
            .in_package("os/exec")
            .dangerous(),
        FlowPattern::sink("command", "Run", "subprocess execution")
            .on_receiver("*Cmd")
            .dangerous(),
        FlowPattern::sink("command", "Output", "subprocess execution")
            .on_receiver("*Cmd")
            .dangerous(),
    ]
}

pub fn entry_points() -> Vec<EntryPointPattern> {
    vec![
        EntryPointPattern::new("main", "main", "program entry point").in_package("main"),
        EntryPointPattern::new("handler", "*", "gin HTTP handler")
            .with_signature("gin.Context")
            .framework("gin"),
        EntryPointPattern::new("handler", "*", "net/http handler")
            .with_signature("http.ResponseWriter")
            .framework("net/http"),
        EntryPointPattern::new("handler", "*", "echo HTTP handler")
            .with_signature("echo.Context")
            .framework("echo"),
        EntryPointPattern::new("handler", "*", "fiber HTTP handler")
            .with_signature("fiber.Ctx")
            .framework("fiber"),
        EntryPointPattern::new("command", "*", "cobra command")
            .with_signature("cobra.Command")
            .framework("cobra"),
        EntryPointPattern::new("test", "Test*", "go test"),
        EntryPointPattern::new("test", "Benchmark*", "go benchmark"),
        EntryPointPattern::new("test", "Fuzz*", "go fuzz target"),
        EntryPointPattern::new("lambda", "*Handler", "AWS Lambda handler")
            .with_signature("events.")
            .framework("aws-lambda"),
        EntryPointPattern::new("grpc", "*", "gRPC service method")
            .with_signature("grpc.ServerStream")
            .framework("grpc"),
    ]
}

pub fn side_effects() -> Vec<SideEffectPattern> {
    use SideEffectCategory::*;
    vec![
        // File I/O
        SideEffectPattern::new(FileIo, "os", "WriteFile", "writes a file").idempotent(),
        SideEffectPattern::new(FileIo, "os", "Create", "creates or truncates a file").idempotent(),
        SideEffectPattern::new(FileIo, "os", "Remove*", "deletes filesystem entries"),
        SideEffectPattern::new(FileIo, "os", "Mkdir*", "creates directories").idempotent(),
        SideEffectPattern::new(FileIo, "os", "Rename", "moves filesystem entries"),
        // Network
        SideEffectPattern::new(Network, "net/http", "Get", "outbound HTTP GET").idempotent(),
        SideEffectPattern::new(Network, "net/http", "Post", "outbound HTTP POST"),
        SideEffectPattern::new(Network, "net/http", "PostForm", "outbound HTTP POST"),
        SideEffectPattern::new(Network, "net", "Dial*", "opens a network connection"),
        // Database
        SideEffectPattern::new(Database, "database/sql", "Exec*", "executes a SQL statement"),
        SideEffectPattern::new(Database, "database/sql", "Query*", "runs a SQL query")
            .idempotent(),
        SideEffectPattern::new(Database, "database/sql", "Begin*", "opens a transaction")
            .reversible(),
        // Logging
        SideEffectPattern::new(Logging, "log", "Print*", "writes to the process log")
            .idempotent(),
        SideEffectPattern::new(Logging, "log/slog", "Info", "structured log record").idempotent(),
        SideEffectPattern::new(Logging, "log/slog", "Error", "structured log record")
            .idempotent(),
        // Global state
        SideEffectPattern::new(GlobalState, "sync/atomic", "Store*", "mutates shared state")
            .reversible(),
        SideEffectPattern::new(GlobalState, "sync", "Do", "once-guarded initialization")
            .idempotent(),
        // Process
        SideEffectPattern::new(Process, "os", "Exit", "terminates the process"),
        SideEffectPattern::new(Process, "os/exec", "Command", "constructs a subprocess")
            .idempotent(),
        SideEffectPattern::new(Process, "os/exec", "Run", "executes a subprocess"),
        // Environment
        SideEffectPattern::new(Environment, "os", "Setenv", "mutates the environment")
            .reversible()
            .idempotent(),
        SideEffectPattern::new(Environment, "os", "Unsetenv", "mutates the environment")
            .reversible()
            .idempotent(),
    ]
}
