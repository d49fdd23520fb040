//! JavaScript / TypeScript pattern catalog
//!
//! The JS-ecosystem variant: express-style handlers, fetch/axios network,
//! fs and child_process effects. Shared by the `javascript` and
//! `typescript` language tags.

use crate::features::pattern_registry::patterns::{
    EntryPointPattern, FlowPattern, SideEffectCategory, SideEffectPattern,
};

pub fn sources() -> Vec<FlowPattern> {
    vec![
        FlowPattern::source("http_input", "body", "request body").on_receiver("*req*"),
        FlowPattern::source("http_input", "query", "query parameters").on_receiver("*req*"),
        FlowPattern::source("http_input", "params", "path parameters").on_receiver("*req*"),
        FlowPattern::source("env", "env", "environment mapping").in_package("process"),
        FlowPattern::source("file", "readFile*", "file contents").in_package("*fs*"),
        FlowPattern::source("cli", "argv", "command-line arguments").in_package("process"),
        FlowPattern::source("database", "find*", "database rows").with_confidence(0.5),
        FlowPattern::source("websocket", "onmessage", "websocket frame"),
    ]
}

pub fn sinks() -> Vec<FlowPattern> {
    vec![
        FlowPattern::sink("response", "send", "response body").on_receiver("*res*"),
        FlowPattern::sink("response", "json", "JSON response").on_receiver("*res*"),
        FlowPattern::sink("response", "render", "template response")
            .on_receiver("*res*")
            .dangerous(),
        FlowPattern::sink("database", "query", "SQL statement").dangerous(),
        FlowPattern::sink("sql", "raw", "raw SQL fragment").dangerous(),
        FlowPattern::sink("file", "writeFile*", "file write").in_package("*fs*").dangerous(),
        FlowPattern::sink("file", "unlink*", "file deletion").in_package("*fs*").dangerous(),
        FlowPattern::sink("log", "log", "console output").in_package("console"),
        FlowPattern::sink("log", "error", "console output").in_package("console"),
        FlowPattern::sink("network", "fetch", "outbound HTTP request").dangerous(),
        FlowPattern::sink("network", "get", "outbound HTTP request")
            .in_package("axios")
            .dangerous(),
        FlowPattern::sink("network", "post", "outbound HTTP request")
            .in_package("axios")
            .dangerous(),
        FlowPattern::sink("command", "exec*", "subprocess execution")
            .in_package("child_process")
            .dangerous(),
        FlowPattern::sink("command", "spawn*", "subprocess spawn")
            .in_package("child_process")
            .dangerous(),
        FlowPattern::sink("eval", "eval", "dynamic evaluation").dangerous(),
    ]
}

pub fn entry_points() -> Vec<EntryPointPattern> {
    vec![
        EntryPointPattern::new("main", "main", "module entry point"),
        EntryPointPattern::new("handler", "*", "express handler")
            .with_signature("req, res")
            .framework("express"),
        EntryPointPattern::new("handler", "*", "express middleware")
            .with_signature("req, res, next")
            .framework("express"),
        EntryPointPattern::new("handler", "*Handler", "request handler by convention"),
        EntryPointPattern::new("test", "test*", "test function"),
        EntryPointPattern::new("test", "it", "spec-style test"),
        EntryPointPattern::new("test", "describe", "spec-style suite"),
        EntryPointPattern::new("lambda", "handler", "AWS Lambda handler")
            .with_signature("event")
            .framework("aws-lambda"),
    ]
}

pub fn side_effects() -> Vec<SideEffectPattern> {
    use SideEffectCategory::*;
    vec![
        SideEffectPattern::new(FileIo, "fs", "writeFile*", "writes a file").idempotent(),
        SideEffectPattern::new(FileIo, "fs", "unlink*", "deletes a file"),
        SideEffectPattern::new(FileIo, "fs", "mkdir*", "creates directories").idempotent(),
        SideEffectPattern::new(Network, "globalThis", "fetch", "outbound HTTP request"),
        SideEffectPattern::new(Network, "axios", "get", "outbound HTTP GET").idempotent(),
        SideEffectPattern::new(Network, "axios", "post", "outbound HTTP POST"),
        SideEffectPattern::new(Database, "pg", "query", "SQL execution"),
        SideEffectPattern::new(Logging, "console", "log", "console output").idempotent(),
        SideEffectPattern::new(Logging, "console", "error", "console output").idempotent(),
        SideEffectPattern::new(GlobalState, "globalThis", "set*", "mutates global scope")
            .reversible(),
        SideEffectPattern::new(Process, "process", "exit", "terminates the process"),
        SideEffectPattern::new(Process, "child_process", "exec*", "executes a subprocess"),
        SideEffectPattern::new(Environment, "process", "env", "reads/mutates environment")
            .reversible(),
    ]
}
