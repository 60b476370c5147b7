//! Stateless request builder and response parser for the todo store.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each store operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! One build/parse pair is one attempt; retries and timeouts belong to the
//! transport.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{check_listing, ErrorBody, NewTodo, Todo, TodoId};

/// Characters left as-is in an id path segment (RFC 3986 unreserved).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Synchronous, stateless client for the todo store.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &NewTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_delete_todo(&self, id: &TodoId) -> HttpRequest {
        let segment = utf8_percent_encode(&id.to_string(), PATH_SEGMENT).to_string();
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/todos/{segment}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Decode a listing. A listing with blank texts or repeated ids is
    /// rejected as a decoding failure so it never reaches local state.
    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_success(&response)?;
        let todos: Vec<Todo> =
            serde_json::from_str(&response.body).map_err(|e| ApiError::Decoding(e.to_string()))?;
        check_listing(&todos).map_err(ApiError::Decoding)?;
        Ok(todos)
    }

    /// A failed create surfaces the store's `{"error": ...}` message as
    /// `Validation` when the body carries one.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        if !response.is_success() {
            return Err(match serde_json::from_str::<ErrorBody>(&response.body) {
                Ok(body) => ApiError::Validation { message: body.error },
                Err(_) => ApiError::Transport {
                    status: response.status,
                },
            });
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decoding(e.to_string()))
    }

    /// The body of a successful delete is ignored.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }
}

fn check_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ApiError::Transport {
            status: response.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000")
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = NewTodo {
            text: "Buy milk".to_string(),
            category: Some("Shopping".to_string()),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["text"], "Buy milk");
        assert_eq!(body["category"], "Shopping");
    }

    #[test]
    fn build_create_todo_omits_absent_category() {
        let input = NewTodo {
            text: "Buy milk".to_string(),
            category: None,
        };
        let req = client().build_create_todo(&input).unwrap();
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body.get("category").is_none());
    }

    #[test]
    fn build_delete_todo_addresses_by_id() {
        let req = client().build_delete_todo(&TodoId::Number(12));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/todos/12");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_delete_todo_encodes_text_ids() {
        let req = client().build_delete_todo(&TodoId::from("a b/c"));
        assert_eq!(req.path, "http://localhost:3000/todos/a%20b%2Fc");
    }

    #[test]
    fn parse_list_todos_success() {
        let response = HttpResponse::new(
            200,
            r#"[{"id":1,"text":"Buy milk","category":"Shopping"},{"id":2,"text":"Call mom"}]"#,
        );
        let todos = client().parse_list_todos(response).unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].text, "Buy milk");
        assert_eq!(todos[1].category, None);
    }

    #[test]
    fn parse_list_todos_bad_status() {
        let err = client()
            .parse_list_todos(HttpResponse::new(503, "unavailable"))
            .unwrap_err();
        assert_eq!(err, ApiError::Transport { status: 503 });
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client()
            .parse_list_todos(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decoding(_)));
    }

    #[test]
    fn parse_list_todos_rejects_duplicate_ids() {
        let response = HttpResponse::new(200, r#"[{"id":1,"text":"a"},{"id":1,"text":"b"}]"#);
        let err = client().parse_list_todos(response).unwrap_err();
        assert!(matches!(err, ApiError::Decoding(_)));
    }

    #[test]
    fn parse_create_todo_success() {
        let response = HttpResponse::new(201, r#"{"id":5,"text":"New","category":"Work"}"#);
        let todo = client().parse_create_todo(response).unwrap();
        assert_eq!(todo.id, TodoId::Number(5));
        assert_eq!(todo.text, "New");
    }

    #[test]
    fn parse_create_todo_validation_message() {
        let response = HttpResponse::new(400, r#"{"error":"Todo text is required"}"#);
        let err = client().parse_create_todo(response).unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation {
                message: "Todo text is required".to_string()
            }
        );
    }

    #[test]
    fn parse_create_todo_unstructured_failure() {
        let response = HttpResponse::new(500, "internal error");
        let err = client().parse_create_todo(response).unwrap_err();
        assert_eq!(err, ApiError::Transport { status: 500 });
    }

    #[test]
    fn parse_delete_todo_ignores_body() {
        assert!(client().parse_delete_todo(HttpResponse::new(204, "")).is_ok());
        assert!(client()
            .parse_delete_todo(HttpResponse::new(200, r#"{"message":"deleted"}"#))
            .is_ok());
    }

    #[test]
    fn parse_delete_todo_not_found() {
        let err = client()
            .parse_delete_todo(HttpResponse::new(404, r#"{"error":"Todo not found"}"#))
            .unwrap_err();
        assert_eq!(err, ApiError::Transport { status: 404 });
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:3000/");
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:3000/todos");
    }
}
