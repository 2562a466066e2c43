use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::{json, Value};

use crate::model::Response;

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Goodsy Goods - Swagger UI</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

pub fn docs_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/docs", web::get().to(docs))
        .route("/openapi.json", web::get().to(openapi));
}

async fn docs() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(SWAGGER_UI)
}

async fn openapi() -> HttpResponse {
    Response::data(&StatusCode::OK, openapi_document())
}

fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": { "title": "Goodsy Goods", "version": "1.0" },
        "paths": paths(),
        "components": { "schemas": schemas() }
    })
}

fn paths() -> Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    });
    let date_param = |name: &str, required: bool| {
        json!({
            "name": name,
            "in": "query",
            "required": required,
            "schema": { "type": "string", "format": "date-time" }
        })
    };
    let bad_request = error_response("Invalid document schema or input data");
    let not_found = error_response("Shop unit not found");

    json!({
        "/imports": {
            "post": {
                "summary": "Create or update offers and categories",
                "requestBody": {
                    "required": true,
                    "content": json_content("ShopUnitImportRequest")
                },
                "responses": {
                    "200": { "description": "Import succeeded" },
                    "400": bad_request
                }
            }
        },
        "/delete/{id}": {
            "delete": {
                "summary": "Delete a shop unit with its subtree",
                "parameters": [id_param],
                "responses": {
                    "200": { "description": "Delete succeeded" },
                    "400": bad_request,
                    "404": not_found
                }
            }
        },
        "/nodes/{id}": {
            "get": {
                "summary": "Shop unit with all of its children",
                "parameters": [id_param],
                "responses": {
                    "200": { "description": "Shop unit tree", "content": json_content("ShopUnit") },
                    "400": bad_request,
                    "404": not_found
                }
            }
        },
        "/sales": {
            "get": {
                "summary": "Offers whose import was repeated within 24 hours before date",
                "parameters": [date_param("date", true)],
                "responses": {
                    "200": {
                        "description": "Updated offers",
                        "content": json_content("ShopUnitStatisticResponse")
                    },
                    "400": bad_request
                }
            }
        },
        "/node/{id}/statistic": {
            "get": {
                "summary": "Update history of a shop unit within [dateStart, dateEnd)",
                "parameters": [id_param, date_param("dateStart", false), date_param("dateEnd", false)],
                "responses": {
                    "200": {
                        "description": "Shop unit history",
                        "content": json_content("ShopUnitStatisticResponse")
                    },
                    "400": bad_request,
                    "404": not_found
                }
            }
        }
    })
}

fn schemas() -> Value {
    let uuid = json!({ "type": "string", "format": "uuid" });
    let nullable_uuid = json!({ "type": "string", "format": "uuid", "nullable": true });
    let date_time = json!({ "type": "string", "format": "date-time" });
    let kind = schema_ref("ShopUnitType");

    json!({
        "ShopUnitType": { "type": "string", "enum": ["OFFER", "CATEGORY"] },
        "ShopUnitImport": {
            "type": "object",
            "required": ["id", "name", "type"],
            "properties": {
                "id": uuid,
                "name": { "type": "string" },
                "parentId": nullable_uuid,
                "type": kind,
                "price": { "type": "integer", "format": "int64", "minimum": 0, "nullable": true }
            }
        },
        "ShopUnitImportRequest": {
            "type": "object",
            "required": ["items", "updateDate"],
            "properties": {
                "items": { "type": "array", "minItems": 1, "items": schema_ref("ShopUnitImport") },
                "updateDate": date_time
            }
        },
        "ShopUnit": {
            "type": "object",
            "required": ["id", "name", "type", "date"],
            "properties": {
                "id": uuid,
                "name": { "type": "string" },
                "parentId": nullable_uuid,
                "type": kind,
                "price": { "type": "integer", "format": "int64", "nullable": true },
                "date": date_time,
                "children": { "type": "array", "nullable": true, "items": schema_ref("ShopUnit") }
            }
        },
        "ShopUnitStatisticUnit": {
            "type": "object",
            "required": ["id", "name", "type", "date"],
            "properties": {
                "id": uuid,
                "name": { "type": "string" },
                "parentId": nullable_uuid,
                "type": kind,
                "price": { "type": "integer", "format": "int64", "nullable": true },
                "date": date_time
            }
        },
        "ShopUnitStatisticResponse": {
            "type": "object",
            "properties": {
                "items": { "type": "array", "items": schema_ref("ShopUnitStatisticUnit") }
            }
        },
        "Error": {
            "type": "object",
            "required": ["code", "message"],
            "properties": {
                "code": { "type": "integer" },
                "message": { "type": "string" }
            }
        }
    })
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn json_content(schema: &str) -> Value {
    json!({ "application/json": { "schema": schema_ref(schema) } })
}

fn error_response(description: &str) -> Value {
    json!({ "description": description, "content": json_content("Error") })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swagger_page_loads_the_document() {
        assert!(SWAGGER_UI.starts_with("<!DOCTYPE html>"));
        assert!(SWAGGER_UI.contains(r##"dom_id: "#swagger-ui""##));
        assert!(SWAGGER_UI.contains(r#"url: "/openapi.json""#));
        assert!(SWAGGER_UI.trim_end().ends_with("</html>"));
    }

    #[test]
    fn document_lists_every_route() {
        let document = openapi_document();
        let paths = document["paths"].as_object().unwrap();
        for path in [
            "/imports",
            "/delete/{id}",
            "/nodes/{id}",
            "/sales",
            "/node/{id}/statistic",
        ] {
            assert!(paths.contains_key(path), "{path} is missing");
        }
        assert_eq!(
            document["paths"]["/sales"]["get"]["responses"]["200"]["description"],
            "Updated offers"
        );
    }
}
