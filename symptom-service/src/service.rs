use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use symptom_flow::{
    ConversationEngine, EngineConfig, FlowError, FlowRunner, InMemorySessionStorage, LocalBackend,
    ReferenceData, Session, SymptomBackend, Turn,
    protocol::{
        FollowupRequest, FollowupResponse, PredictionRequest, PredictionResponse, ResponseStatus,
        SymptomLookupRequest, SymptomLookupResponse,
    },
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    config::ServiceConfig,
    models::{ChatRequest, ChatResponse},
    telemetry::correlation_id_middleware,
};

pub const TURN_FAILED_MESSAGE: &str =
    "Sorry, there was an error processing your message. Please try again.";

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn session_error(error: FlowError, session_id: &str) -> ApiError {
    match error {
        FlowError::SessionNotFound(_) => not_found_error("Session not found", session_id),
        other => {
            error!(session_id, error = %other, "Turn failed");
            internal_error(TURN_FAILED_MESSAGE, &other.to_string())
        }
    }
}

fn parse_session_id(session_id: &str) -> Result<(), ApiError> {
    Uuid::parse_str(session_id)
        .map(|_| ())
        .map_err(|_| bad_request_error("Invalid session id"))
}

#[derive(Clone)]
pub struct AppState {
    pub flow_runner: FlowRunner,
    /// Answers the knowledge endpoints used by remote-mode clients
    pub knowledge: Arc<dyn SymptomBackend>,
    pub reference: Arc<ReferenceData>,
}

impl AppState {
    pub fn new(
        config: EngineConfig,
        backend: Arc<dyn SymptomBackend>,
        reference: Arc<ReferenceData>,
    ) -> Self {
        let engine = Arc::new(ConversationEngine::new(backend.clone(), config));
        let storage = Arc::new(InMemorySessionStorage::default());
        Self {
            flow_runner: FlowRunner::new(engine, storage),
            knowledge: backend,
            reference,
        }
    }
}

pub fn create_app(config: &ServiceConfig) -> Result<Router, FlowError> {
    let app_state = create_app_state(config)?;
    Ok(build_router(app_state))
}

fn create_app_state(config: &ServiceConfig) -> Result<AppState, FlowError> {
    let reference = match &config.reference_path {
        Some(path) => ReferenceData::load(path)?,
        None => ReferenceData::builtin()?,
    };
    let reference = Arc::new(reference);

    let backend = match config.seed {
        Some(seed) => LocalBackend::seeded(reference.clone(), &config.engine, seed),
        None => LocalBackend::from_entropy(reference.clone(), &config.engine),
    };
    info!(
        symptoms = reference.vocabulary().len(),
        diseases = reference.catalog().len(),
        seeded = config.seed.is_some(),
        "Reference data ready"
    );

    Ok(AppState::new(
        config.engine.clone(),
        Arc::new(backend),
        reference,
    ))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/chat", post(chat))
        .route("/chat/{session_id}/reset", post(reset_chat))
        .route(
            "/session/{session_id}",
            get(get_session).delete(end_session),
        )
        .route("/get_symptoms", post(get_symptoms))
        .route("/get_followup_questions", post(get_followup_questions))
        .route("/predict", post(predict))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(correlation_id_middleware))
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Symptom Checker Service",
        "version": "0.1.0",
        "description": "Scripted symptom-checker conversations with severity scoring",
        "endpoints": {
            "POST /chat": "Start a conversation or send the next message",
            "POST /chat/{session_id}/reset": "Start the conversation over",
            "GET /session/{session_id}": "Get the full session state",
            "DELETE /session/{session_id}": "End a conversation",
            "POST /get_symptoms": "Match free text against the symptom vocabulary",
            "POST /get_followup_questions": "Follow-up questions for a symptom",
            "POST /predict": "Predict a disease and score severity",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn run_turn(state: &AppState, session_id: &str, content: &str) -> Result<Turn, ApiError> {
    state
        .flow_runner
        .run(session_id, content)
        .await
        .map_err(|e| session_error(e, session_id))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    let Some(session_id) = request.session_id else {
        let (session, welcome) = state
            .flow_runner
            .start()
            .await
            .map_err(|e| internal_error("Failed to start conversation", &e.to_string()))?;

        if request.content.trim().is_empty() {
            return Ok(Json(ChatResponse::opened(&session, welcome)));
        }
        let turn = run_turn(&state, &session.id, &request.content).await?;
        return Ok(Json(ChatResponse::from_turn(turn, welcome)));
    };

    parse_session_id(&session_id)?;
    let turn = run_turn(&state, &session_id, &request.content).await?;
    if let Some(rejection) = &turn.rejection {
        warn!(session_id, %rejection, "Message not accepted");
    }
    Ok(Json(ChatResponse::from_turn(turn, Vec::new())))
}

async fn reset_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ChatResponse> {
    parse_session_id(&session_id)?;
    let (session, welcome) = state
        .flow_runner
        .reset(&session_id)
        .await
        .map_err(|e| session_error(e, &session_id))?;
    Ok(Json(ChatResponse::opened(&session, welcome)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Session> {
    parse_session_id(&session_id)?;
    let session = state
        .flow_runner
        .session(&session_id)
        .await
        .map_err(|e| session_error(e, &session_id))?;
    Ok(Json(session))
}

async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    parse_session_id(&session_id)?;
    state
        .flow_runner
        .session(&session_id)
        .await
        .map_err(|e| session_error(e, &session_id))?;
    state
        .flow_runner
        .end(&session_id)
        .await
        .map_err(|e| internal_error("Failed to end session", &e.to_string()))?;
    info!(session_id, "Conversation ended");
    Ok(Json(json!({ "status": "ended", "session_id": session_id })))
}

async fn get_symptoms(
    State(state): State<AppState>,
    Json(request): Json<SymptomLookupRequest>,
) -> ApiResult<SymptomLookupResponse> {
    // Vocabulary order, as in embedded mode; remote engines auto-select the first match.
    let matches = state
        .knowledge
        .lookup(&request.symptom)
        .await
        .map_err(|e| internal_error("Symptom lookup failed", &e.to_string()))?;
    Ok(Json(SymptomLookupResponse {
        status: ResponseStatus::Success,
        matches,
    }))
}

async fn get_followup_questions(
    State(state): State<AppState>,
    Json(request): Json<FollowupRequest>,
) -> ApiResult<FollowupResponse> {
    if !state.reference.knows_symptom(&request.symptom) {
        return Err(bad_request_error(&format!(
            "Unknown symptom: {}",
            request.symptom
        )));
    }
    let symptoms = state
        .knowledge
        .followups(&request.symptom)
        .await
        .map_err(|e| internal_error("Follow-up planning failed", &e.to_string()))?;
    Ok(Json(FollowupResponse::from_symptoms(symptoms)))
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> ApiResult<PredictionResponse> {
    match state.knowledge.predict(&request).await {
        Ok(diagnosis) => {
            info!(
                disease = %diagnosis.disease,
                score = diagnosis.severity.score,
                "Prediction served"
            );
            Ok(Json(PredictionResponse::success(&diagnosis)))
        }
        Err(FlowError::Backend(message)) => Ok(Json(PredictionResponse::error(message))),
        Err(e) => Err(internal_error("Prediction failed", &e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use symptom_flow::{Diagnosis, HttpBackend, Stage, TurnStatus};
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    use crate::telemetry::CORRELATION_ID_HEADER;

    struct FailingBackend;

    #[async_trait]
    impl SymptomBackend for FailingBackend {
        async fn lookup(&self, _query: &str) -> symptom_flow::Result<Vec<String>> {
            Err(FlowError::Transport("connection refused".to_string()))
        }

        async fn followups(&self, _symptom: &str) -> symptom_flow::Result<Vec<String>> {
            Err(FlowError::Transport("connection refused".to_string()))
        }

        async fn predict(&self, _request: &PredictionRequest) -> symptom_flow::Result<Diagnosis> {
            Err(FlowError::Transport("connection refused".to_string()))
        }
    }

    fn reference() -> Arc<ReferenceData> {
        Arc::new(ReferenceData::builtin().unwrap())
    }

    fn app() -> Router {
        let reference = reference();
        let config = EngineConfig::guided();
        let backend = Arc::new(LocalBackend::seeded(reference.clone(), &config, 7));
        build_router(AppState::new(config, backend, reference))
    }

    fn failing_app() -> Router {
        build_router(AppState::new(
            EngineConfig::guided(),
            Arc::new(FailingBackend),
            reference(),
        ))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn say(app: &Router, session_id: &str, content: &str) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            "/chat",
            Some(json!({ "session_id": session_id, "content": content })),
        )
        .await
    }

    async fn open(app: &Router) -> String {
        let (status, body) = send(app, Method::POST, "/chat", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn responses_carry_correlation_id() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
    }

    #[tokio::test]
    async fn new_chat_returns_welcome() {
        let (status, body) = send(&app(), Method::POST, "/chat", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stage"], "name");
        assert_eq!(body["status"], "waiting_for_input");
        assert!(!body["messages"].as_array().unwrap().is_empty());
        assert!(Uuid::parse_str(body["session_id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn new_chat_with_content_runs_first_turn() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/chat",
            Some(json!({ "content": "Ana" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stage"], "symptom");
        let texts: Vec<&str> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|m| m["content"].as_str())
            .collect();
        assert!(texts.iter().any(|t| t.contains("Ana")));
    }

    #[tokio::test]
    async fn full_conversation_reaches_diagnosis() {
        let app = app();
        let id = open(&app).await;

        let (_, body) = say(&app, &id, "Ana").await;
        assert_eq!(body["stage"], "symptom");
        let (_, body) = say(&app, &id, "itching").await;
        assert_eq!(body["stage"], "days");
        let (_, mut body) = say(&app, &id, "3").await;

        let mut turns = 0;
        while body["status"] != "completed" {
            assert_eq!(body["stage"], "followup");
            turns += 1;
            assert!(turns <= 10, "follow-ups never ended");
            body = say(&app, &id, "no").await.1;
        }

        assert_eq!(body["stage"], "complete");
        assert!(body["diagnosis"]["disease"].is_string());
        assert!(body["diagnosis"]["severity"]["score"].is_number());

        let (status, session) =
            send(&app, Method::GET, &format!("/session/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["stage"], "complete");
        assert_eq!(session["user_name"], "Ana");
        assert_eq!(session["days"], 3);
    }

    #[tokio::test]
    async fn invalid_days_are_rejected_without_advancing() {
        let app = app();
        let id = open(&app).await;
        say(&app, &id, "Ana").await;
        say(&app, &id, "itching").await;

        let (status, body) = say(&app, &id, "a while").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stage"], "days");
        assert!(body["rejection"]["kind"].is_string());
    }

    #[tokio::test]
    async fn unknown_and_malformed_sessions() {
        let app = app();
        let missing = Uuid::new_v4().to_string();

        let (status, body) = say(&app, &missing, "hello").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["session_id"], missing.as_str());

        let (status, _) = say(&app, "not-a-uuid", "hello").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/session/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn backend_failure_returns_error_and_keeps_session() {
        let app = failing_app();
        let id = open(&app).await;
        let (_, body) = say(&app, &id, "Ana").await;
        assert_eq!(body["stage"], "symptom");

        let (status, body) = say(&app, &id, "itching").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], TURN_FAILED_MESSAGE);

        let (_, session) = send(&app, Method::GET, &format!("/session/{id}"), None).await;
        assert_eq!(session["stage"], "symptom");
        assert!(session["current_symptom"].is_null());
    }

    #[tokio::test]
    async fn reset_starts_over_with_same_id() {
        let app = app();
        let id = open(&app).await;
        say(&app, &id, "Ana").await;

        let (status, body) =
            send(&app, Method::POST, &format!("/chat/{id}/reset"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], id.as_str());
        assert_eq!(body["stage"], "name");

        let (_, session) = send(&app, Method::GET, &format!("/session/{id}"), None).await;
        assert!(session["user_name"].is_null());
    }

    #[tokio::test]
    async fn ended_sessions_are_gone() {
        let app = app();
        let id = open(&app).await;

        let (status, _) = send(&app, Method::DELETE, &format!("/session/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, &format!("/session/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_symptoms_matches_free_text() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/get_symptoms",
            Some(json!({ "symptom": "itchy skin" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        let matches: Vec<&str> = body["matches"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(matches.contains(&"skin_rash"));
    }

    #[tokio::test]
    async fn get_symptoms_keeps_vocabulary_order() {
        let (_, body) = send(
            &app(),
            Method::POST,
            "/get_symptoms",
            Some(json!({ "symptom": "itch" })),
        )
        .await;
        assert_eq!(body["matches"], json!(["itching", "internal_itching"]));
    }

    #[tokio::test]
    async fn followup_questions_for_known_symptom() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/get_followup_questions",
            Some(json!({ "symptom": "itching" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let questions = body["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 5);
        assert!(
            questions
                .iter()
                .all(|q| q.as_str().unwrap().starts_with("Are you experiencing "))
        );

        let (status, _) = send(
            &app,
            Method::POST,
            "/get_followup_questions",
            Some(json!({ "symptom": "unicorn_horn" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn predict_scores_and_reports_errors_in_body() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/predict",
            Some(json!({ "symptoms": ["itching", "skin_rash"], "days": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert!(body["prediction"].is_string());
        assert_eq!(body["severity"]["score"], 2.0);
        assert_eq!(body["severity"]["level"], "low");
        assert_eq!(
            body["severity"]["advice"],
            "You can try home remedies, but monitor your condition."
        );

        let (status, body) = send(
            &app,
            Method::POST,
            "/predict",
            Some(json!({ "symptoms": ["unicorn_horn"], "days": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("unicorn_horn"));
    }

    #[tokio::test]
    async fn remote_engine_converses_through_knowledge_endpoints() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app()).await });

        let remote = HttpBackend::new(format!("http://{addr}")).unwrap();
        let engine = ConversationEngine::new(Arc::new(remote), EngineConfig::guided());
        let reference = reference();

        let (mut session, _) = engine.start_new();
        for utterance in ["Ana", "itching", "3"] {
            session = engine.advance(&session, utterance).await.unwrap().session;
        }
        assert_eq!(session.stage, Stage::Followup);
        assert_eq!(session.current_symptom.as_deref(), Some("itching"));
        assert!(!session.followup_symptoms.is_empty());
        assert!(
            session
                .followup_symptoms
                .iter()
                .all(|s| s != "itching" && reference.knows_symptom(s))
        );

        let mut status = TurnStatus::WaitingForInput;
        for _ in 0..10 {
            let turn = engine.advance(&session, "yes").await.unwrap();
            status = turn.status();
            session = turn.session;
            if status == TurnStatus::Completed {
                break;
            }
        }

        assert_eq!(status, TurnStatus::Completed);
        assert_eq!(session.stage, Stage::Complete);
        assert_eq!(session.experienced_symptoms, session.followup_symptoms);

        let diagnosis = session.diagnosis.unwrap();
        assert!(reference.disease(&diagnosis.disease).is_some());
        let n = session.experienced_symptoms.len() as f64;
        assert!((diagnosis.severity.score - n * 3.0 / (n + 1.0)).abs() < 1e-9);
    }
}
