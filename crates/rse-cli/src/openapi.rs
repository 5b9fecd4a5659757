use serde_json::{json, Value};

/// Hand-built OpenAPI 3.0 document for the routes `rse_api::build_app`
/// registers. There's no schema-derivation crate in the dependency stack,
/// so this mirrors the route table directly rather than deriving it from
/// the handlers.
pub fn generate() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Cloud Security Rule Engine Control Plane",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/health": {
                "get": { "summary": "Liveness check", "responses": { "200": { "description": "OK" } } }
            },
            "/jobs": {
                "post": {
                    "summary": "Submit a job",
                    "responses": {
                        "200": { "description": "Job admitted" },
                        "400": { "description": "Bad request" },
                        "403": { "description": "Forbidden — job lock conflict or license denial" },
                        "404": { "description": "Tenant or ruleset not found" },
                        "409": { "description": "Ambiguous license selection" },
                    },
                },
            },
            "/jobs/{id}": {
                "delete": {
                    "summary": "Terminate a job",
                    "responses": { "200": { "description": "Job terminated" }, "404": { "description": "Not found" } },
                },
            },
            "/rulesets": {
                "post": {
                    "summary": "Create a ruleset",
                    "responses": { "201": { "description": "Created" }, "409": { "description": "Version conflict" } },
                },
            },
            "/rulesets/{customer}/{name}": {
                "patch": {
                    "summary": "Update a ruleset",
                    "responses": { "200": { "description": "Updated" }, "409": { "description": "No-op without force" } },
                },
            },
            "/rulesets/release": {
                "post": {
                    "summary": "Release rulesets to the License Manager",
                    "responses": {
                        "201": { "description": "All released" },
                        "207": { "description": "Partial release" },
                    },
                },
            },
            "/scheduled-jobs": {
                "post": { "summary": "Register a scheduled job", "responses": { "200": { "description": "Registered" } } },
            },
            "/scheduled-jobs/{tenant}": {
                "get": { "summary": "List scheduled jobs for a tenant", "responses": { "200": { "description": "OK" } } },
            },
            "/scheduled-jobs/{customer}/{name}": {
                "get": { "summary": "Get a scheduled job", "responses": { "200": { "description": "OK" }, "404": { "description": "Not found" } } },
                "patch": { "summary": "Update a scheduled job", "responses": { "200": { "description": "Updated" } } },
                "delete": { "summary": "Delete a scheduled job", "responses": { "204": { "description": "Deleted" } } },
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_declares_openapi_3() {
        let doc = generate();
        assert_eq!(doc["openapi"], "3.0.3");
        assert!(doc["paths"]["/jobs"]["post"].is_object());
    }
}
