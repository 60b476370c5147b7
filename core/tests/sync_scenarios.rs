//! Sync behavior against an in-memory store.
//!
//! `FakeStore` answers requests the way the real store does and can be told
//! to fail the next call, so each property is checked without a network.

use std::collections::VecDeque;

use serde_json::json;
use todo_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, Intent, Outbound, Session, SyncCore, SyncError,
    Todo, TodoClient, TodoId, Transport,
};

const BASE_URL: &str = "http://store";

#[derive(Default)]
struct FakeStore {
    next_id: i64,
    todos: Vec<Todo>,
    requests: usize,
    failures: VecDeque<Result<HttpResponse, ApiError>>,
}

impl FakeStore {
    fn with(todos: &[(i64, &str, &str)]) -> Self {
        let todos: Vec<Todo> = todos
            .iter()
            .map(|(id, text, category)| Todo {
                id: TodoId::Number(*id),
                text: text.to_string(),
                category: Some(category.to_string()),
            })
            .collect();
        let next_id = todos.len() as i64 + 1;
        Self {
            next_id,
            todos,
            ..Self::default()
        }
    }

    fn fail_next(&mut self, outcome: Result<HttpResponse, ApiError>) {
        self.failures.push_back(outcome);
    }

    fn answer(&mut self, req: &HttpRequest) -> HttpResponse {
        let path = req.path.strip_prefix(BASE_URL).unwrap_or(req.path.as_str());
        match (req.method, path) {
            (HttpMethod::Get, "/todos") => {
                HttpResponse::new(200, serde_json::to_string(&self.todos).unwrap())
            }
            (HttpMethod::Post, "/todos") => {
                let body: serde_json::Value =
                    serde_json::from_str(req.body.as_deref().unwrap_or("{}")).unwrap();
                let text = body["text"].as_str().unwrap_or("").trim().to_string();
                if text.is_empty() {
                    return HttpResponse::new(400, json!({"error": "Todo text is required"}).to_string());
                }
                let todo = Todo {
                    id: TodoId::Number(self.next_id),
                    text,
                    category: body["category"].as_str().map(str::to_string),
                };
                self.next_id += 1;
                self.todos.push(todo.clone());
                HttpResponse::new(201, serde_json::to_string(&todo).unwrap())
            }
            (HttpMethod::Delete, rest) => {
                let id: TodoId = rest.trim_start_matches("/todos/").parse().unwrap();
                match self.todos.iter().position(|t| t.id == id) {
                    Some(index) => {
                        self.todos.remove(index);
                        HttpResponse::new(204, "")
                    }
                    None => HttpResponse::new(404, json!({"error": "Todo not found"}).to_string()),
                }
            }
            _ => HttpResponse::new(405, ""),
        }
    }
}

impl Transport for FakeStore {
    fn execute(&mut self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests += 1;
        match self.failures.pop_front() {
            Some(outcome) => outcome,
            None => Ok(self.answer(req)),
        }
    }
}

fn todo(id: i64, text: &str, category: &str) -> Todo {
    Todo {
        id: TodoId::Number(id),
        text: text.to_string(),
        category: Some(category.to_string()),
    }
}

fn open(store: &mut FakeStore) -> Session<&mut FakeStore> {
    Session::open(TodoClient::new(BASE_URL), store)
}

#[test]
fn concrete_scenario() {
    let mut store = FakeStore::with(&[(1, "Buy milk", "Shopping")]);
    let mut session = open(&mut store);

    assert_eq!(session.state().items(), &[todo(1, "Buy milk", "Shopping")]);
    assert!(session.state().last_error().is_none());

    let state = session.create("Walk dog", Some("Health"));
    assert_eq!(
        state.items(),
        &[todo(1, "Buy milk", "Shopping"), todo(2, "Walk dog", "Health")]
    );

    let state = session.delete(TodoId::Number(1));
    assert_eq!(state.items(), &[todo(2, "Walk dog", "Health")]);

    let state = session.delete(TodoId::Number(99));
    assert_eq!(state.items(), &[todo(2, "Walk dog", "Health")]);
    assert_eq!(
        state.last_error(),
        Some(&SyncError::Delete(ApiError::Transport { status: 404 }))
    );
    assert_eq!(state.error_message().as_deref(), Some("failed to delete, try again"));
}

#[test]
fn refresh_is_idempotent() {
    let mut store = FakeStore::with(&[(1, "a", "Work"), (2, "b", "Home")]);
    let mut session = open(&mut store);
    let first = session.refresh().clone();
    let second = session.refresh().clone();
    assert_eq!(first, second);
}

#[test]
fn created_entity_gets_store_assigned_id() {
    let mut store = FakeStore::with(&[(1, "a", "Work")]);
    store.next_id = 40;
    let mut session = open(&mut store);

    let state = session.create("  Pay rent ", Some("Personal"));
    let new: Vec<&Todo> = state.items().iter().filter(|t| t.text == "Pay rent").collect();
    assert_eq!(new.len(), 1);
    assert_eq!(new[0].id, TodoId::Number(40));
    assert_eq!(new[0].category.as_deref(), Some("Personal"));
}

/// Run an operation and every follow-up call it produces.
fn drive(core: &mut SyncCore, store: &mut FakeStore, mut next: Option<Outbound>) {
    while let Some(out) = next {
        let outcome = store.execute(&out.request);
        next = core.complete(out.pending, outcome);
    }
}

fn loaded(store: &mut FakeStore) -> SyncCore {
    let mut core = SyncCore::new(TodoClient::new(BASE_URL));
    let out = core.begin_refresh();
    drive(&mut core, store, Some(out));
    core
}

#[test]
fn failed_list_preserves_items() {
    let mut store = FakeStore::with(&[(1, "a", "Work")]);
    let mut core = loaded(&mut store);
    let before = core.state().items().to_vec();

    store.fail_next(Err(ApiError::Network("connection reset".to_string())));
    let out = core.begin_refresh();
    drive(&mut core, &mut store, Some(out));

    assert_eq!(core.state().items(), before.as_slice());
    assert!(!core.state().is_loading());
    assert!(matches!(core.state().last_error(), Some(SyncError::Refresh(_))));
}

#[test]
fn failed_list_on_malformed_body_preserves_items() {
    let mut store = FakeStore::with(&[(1, "a", "Work")]);
    let mut core = loaded(&mut store);
    let before = core.state().items().to_vec();

    store.fail_next(Ok(HttpResponse::new(200, r#"[{"id":null,"text":"a"}]"#)));
    let out = core.begin_refresh();
    drive(&mut core, &mut store, Some(out));

    assert_eq!(core.state().items(), before.as_slice());
    assert!(matches!(
        core.state().last_error().map(SyncError::cause),
        Some(ApiError::Decoding(_))
    ));
}

#[test]
fn failed_create_preserves_items_and_reports_store_message() {
    let mut store = FakeStore::with(&[(1, "a", "Work")]);
    let mut core = loaded(&mut store);
    let before = core.state().items().to_vec();

    let rejected = HttpResponse::new(400, json!({"error": "Todo text is required"}).to_string());
    store.fail_next(Ok(rejected));
    let out = core.begin_create("x", None);
    drive(&mut core, &mut store, out);

    assert_eq!(core.state().items(), before.as_slice());
    assert_eq!(core.state().error_message().as_deref(), Some("Todo text is required"));
}

#[test]
fn failed_create_without_message_uses_generic_text() {
    let mut store = FakeStore::with(&[(1, "a", "Work")]);
    let mut core = loaded(&mut store);
    let before = core.state().items().to_vec();

    store.fail_next(Ok(HttpResponse::new(500, "oops")));
    let out = core.begin_create("Walk dog", Some("Health"));
    drive(&mut core, &mut store, out);

    assert_eq!(core.state().items(), before.as_slice());
    assert_eq!(core.state().error_message().as_deref(), Some("failed to create todo"));
    assert_eq!(store.todos.len(), 1);
}

#[test]
fn failed_delete_preserves_items() {
    let mut store = FakeStore::with(&[(1, "a", "Work"), (2, "b", "Work")]);
    let mut core = loaded(&mut store);
    let before = core.state().items().to_vec();

    store.fail_next(Ok(HttpResponse::new(503, "")));
    let out = core.begin_delete(TodoId::Number(2));
    drive(&mut core, &mut store, Some(out));

    assert_eq!(core.state().items(), before.as_slice());
    assert_eq!(
        core.state().last_error(),
        Some(&SyncError::Delete(ApiError::Transport { status: 503 }))
    );
}

#[test]
fn mutation_success_then_failed_refresh_reports_refresh() {
    let mut store = FakeStore::with(&[(1, "a", "Work")]);
    let mut core = loaded(&mut store);
    let before = core.state().items().to_vec();

    let out = core.begin_delete(TodoId::Number(1));
    let outcome = store.execute(&out.request);
    let refresh = core.complete(out.pending, outcome);
    assert!(core.state().last_error().is_none());

    store.fail_next(Ok(HttpResponse::new(502, "")));
    drive(&mut core, &mut store, refresh);
    assert_eq!(core.state().items(), before.as_slice());
    assert!(matches!(core.state().last_error(), Some(SyncError::Refresh(_))));
}

#[test]
fn success_clears_error_regardless_of_prior_value() {
    let mut store = FakeStore::default();
    store.next_id = 1;
    store.fail_next(Ok(HttpResponse::new(500, "")));
    let mut session = open(&mut store);
    assert!(session.state().last_error().is_some());

    let state = session.create("Walk dog", Some("Health"));
    assert!(state.last_error().is_none());
    assert_eq!(state.items().len(), 1);
}

#[test]
fn whitespace_text_issues_no_request() {
    let mut store = FakeStore::with(&[(1, "a", "Work")]);
    let mut session = open(&mut store);
    session.delete(TodoId::Number(42));
    let before = session.state().clone();

    let state = session.create("   ", Some("Work"));
    assert_eq!(state, &before);
    assert!(Intent::submit("   ", None).is_none());

    let (_, store) = session.into_parts();
    // initial refresh + failed delete
    assert_eq!(store.requests, 2);
}

#[test]
fn overlapping_mutations_race_and_last_refresh_wins() {
    let mut store = FakeStore::with(&[(1, "a", "Work")]);
    let mut core = SyncCore::new(TodoClient::new(BASE_URL));

    let create = core.dispatch(Intent::submit("b", Some("Work")).unwrap()).unwrap();
    let delete = core.dispatch(Intent::delete(1i64)).unwrap();

    // Both mutations reach the store before either reconciling refresh.
    let created = store.execute(&create.request);
    let deleted = store.execute(&delete.request);
    let after_create = core.complete(create.pending, created).unwrap();
    let after_delete = core.complete(delete.pending, deleted).unwrap();

    // The refresh issued for the delete completes first with the final store.
    let outcome = store.execute(&after_delete.request);
    core.complete(after_delete.pending, outcome);
    assert!(core.state().is_loading());

    let outcome = store.execute(&after_create.request);
    core.complete(after_create.pending, outcome);
    assert!(!core.state().is_loading());
    assert_eq!(core.state().items(), &[todo(2, "b", "Work")]);
}
