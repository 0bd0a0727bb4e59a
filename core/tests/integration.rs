//! Full CRUD lifecycle test against the live server.
//!
//! Starts the server on a random port with an in-memory database, then
//! exercises every core client operation over real HTTP using ureq.

use chrono::NaiveDate;
use todo_core::{ApiError, HttpMethod, HttpResponse, TodoClient, TodoInput};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`.
fn execute(req: todo_core::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn start_server() -> TodoClient {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let store = todo_server::Store::in_memory().await.unwrap();
            let config = todo_server::Config::default();
            todo_server::run(listener, store, &config, std::future::pending()).await
        })
        .unwrap();
    });

    TodoClient::new(&format!("http://{addr}"))
}

#[test]
fn crud_lifecycle() {
    let client = start_server();

    // Step 1: list — should be empty.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    // Step 2: create a todo with a start time.
    let start = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    let create_input = TodoInput {
        title: "Integration test".to_string(),
        description: "over the wire".to_string(),
        start_time: Some(start),
        progress: 25.0,
        ..Default::default()
    };
    let req = client.build_create_todo(&create_input).unwrap();
    let created = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!(created.title, "Integration test");
    assert_eq!(created.start_time, Some(start));
    assert!(created.end_time.is_none());
    let id = created.id;

    // Step 3: get the created todo.
    let fetched = client.parse_get_todo(execute(client.build_get_todo(id))).unwrap();
    assert_eq!(fetched, created);

    // Step 4: mark it done.
    let update_input = TodoInput {
        completed: true,
        progress: 100.0,
        ..TodoInput::from(&fetched)
    };
    let req = client.build_update_todo(id, &update_input).unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert!(updated.completed);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.start_time, Some(start));

    // Step 5: rejected create surfaces the server's reason.
    let req = client.build_create_todo(&TodoInput::default()).unwrap();
    let err = client.parse_create_todo(execute(req)).unwrap_err();
    assert!(
        matches!(&err, ApiError::HttpError { status: 400, body } if body == "Title is required"),
        "{err}"
    );

    // Step 6: list — should have one item.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos, vec![updated]);

    // Step 7: delete.
    client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap();

    // Step 8: get after delete — should be NotFound.
    let err = client.parse_get_todo(execute(client.build_get_todo(id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 9: delete again — still succeeds.
    client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap();

    // Step 10: list — should be empty again.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list after delete");
}
