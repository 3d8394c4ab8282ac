//! OpenAPI description of the HTTP API.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use super::AppState;
use crate::config::ServerConfig;

/// GET /openapi.json
pub async fn serve(State(state): State<AppState>) -> Json<Value> {
    Json(document(&state.config))
}

/// Response carrying the `{code, reason, message}` envelope.
fn status_body(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Status" }
            }
        }
    })
}

fn path_parameter() -> Value {
    json!({
        "in": "path",
        "name": "path",
        "required": true,
        "schema": { "type": "string" },
        "description": "filesystem path below one of the supported roots"
    })
}

fn multipart_body() -> Value {
    json!({
        "required": true,
        "content": {
            "multipart/form-data": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "files": {
                            "type": "array",
                            "items": { "type": "string", "format": "binary" }
                        }
                    }
                }
            }
        }
    })
}

/// Builds the OpenAPI document for the configured server.
pub fn document(config: &ServerConfig) -> Value {
    let server_url = config
        .server
        .mount_point()
        .unwrap_or_else(|| "/".to_string());
    let errors = |codes: &[&str]| -> Value {
        let mut responses = serde_json::Map::new();
        for code in codes {
            let name = match *code {
                "400" => "BadRequest",
                "401" => "Unauthorized",
                "403" => "Forbidden",
                _ => "NotFound",
            };
            responses.insert(
                code.to_string(),
                json!({ "$ref": format!("#/components/responses/{name}") }),
            );
        }
        Value::Object(responses)
    };
    let with = |mut base: Value, extra: Value| -> Value {
        if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
            base.extend(extra);
        }
        base
    };

    json!({
        "openapi": config.server.openapi_version,
        "info": {
            "title": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": "CRUD operations over files in the host filesystem"
        },
        "servers": [{ "url": server_url }],
        "tags": [{
            "name": "filesystem",
            "description": "CRUD operations over files in the current filesystem"
        }],
        "paths": {
            "/filesystem/supported-paths": {
                "get": {
                    "tags": ["filesystem"],
                    "summary": "List the roots requests may target",
                    "responses": {
                        "200": {
                            "description": "Ok",
                            "content": {
                                "application/json": {
                                    "schema": { "type": "array", "items": { "type": "string" } }
                                }
                            }
                        }
                    }
                }
            },
            "/filesystem/{path}": {
                "parameters": [path_parameter()],
                "get": {
                    "tags": ["filesystem"],
                    "summary": "List a directory or download a file or directory archive",
                    "security": [{ "BasicAuth": [] }],
                    "parameters": [
                        { "in": "query", "name": "all", "schema": { "type": "boolean" } },
                        { "in": "query", "name": "long", "schema": { "type": "boolean" } }
                    ],
                    "responses": with(json!({
                        "200": {
                            "description": "Ok",
                            "content": {
                                "application/json": {
                                    "schema": { "type": "array", "items": { "type": "string" } }
                                },
                                "application/octet-stream": {
                                    "schema": { "type": "string", "format": "binary" }
                                }
                            }
                        }
                    }), errors(&["400", "401", "403", "404"]))
                },
                "post": {
                    "tags": ["filesystem"],
                    "summary": "Upload new files into a directory",
                    "security": [{ "BasicAuth": [] }],
                    "requestBody": multipart_body(),
                    "responses": with(json!({ "201": status_body("Created") }),
                        errors(&["400", "401", "403", "404"]))
                },
                "put": {
                    "tags": ["filesystem"],
                    "summary": "Replace existing files in a directory",
                    "security": [{ "BasicAuth": [] }],
                    "requestBody": multipart_body(),
                    "responses": with(json!({ "200": status_body("Ok") }),
                        errors(&["400", "401", "403", "404"]))
                },
                "delete": {
                    "tags": ["filesystem"],
                    "summary": "Delete a file",
                    "security": [{ "BasicAuth": [] }],
                    "responses": with(json!({ "200": status_body("Ok") }),
                        errors(&["400", "401", "403", "404"]))
                }
            }
        },
        "components": {
            "securitySchemes": {
                "BasicAuth": { "type": "http", "scheme": "basic" }
            },
            "schemas": {
                "Status": {
                    "type": "object",
                    "properties": {
                        "code": { "type": "integer" },
                        "reason": { "type": "string" },
                        "message": { "type": "string" }
                    }
                }
            },
            "responses": {
                "BadRequest": status_body("Bad Request"),
                "Unauthorized": status_body("Unauthorized"),
                "Forbidden": status_body("Forbidden"),
                "NotFound": status_body("Not Found")
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_configured_version_and_root() {
        let mut config = ServerConfig::default();
        config.server.openapi_version = "3.1.0".into();
        config.server.application_root = "/api".into();

        let doc = document(&config);
        assert_eq!(doc["openapi"], "3.1.0");
        assert_eq!(doc["servers"][0]["url"], "/api");
    }

    #[test]
    fn describes_every_operation() {
        let doc = document(&ServerConfig::default());
        let path = &doc["paths"]["/filesystem/{path}"];
        for method in ["get", "post", "put", "delete"] {
            assert_eq!(
                path[method]["responses"]["401"]["$ref"],
                "#/components/responses/Unauthorized",
                "{method}"
            );
        }
        assert!(doc["paths"]["/filesystem/supported-paths"]["get"].is_object());
        assert_eq!(doc["components"]["securitySchemes"]["BasicAuth"]["scheme"], "basic");
    }
}
