//! In-memory stand-in for the ARMETA backend, selected with
//! `transport.backend = "fake"`. Single user; reviews and forum posts are
//! kept as JSON objects so both collections share one code path.

use crate::domain_model::{HttpMethod, HttpResponse, RequestContext};
use crate::domain_port::{HttpTransport, TransportError};
use chrono::Utc;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const FAKE_EMAIL: &str = "student@armeta.test";
pub const FAKE_PASSWORD: &str = "password";

#[derive(Debug, Clone)]
pub struct FakeAuthRoutes {
    pub login_path: String,
    pub refresh_path: String,
    pub logout_path: String,
    pub me_path: String,
}

impl Default for FakeAuthRoutes {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            logout_path: "/auth/logout".to_string(),
            me_path: "/auth/me".to_string(),
        }
    }
}

struct FakeState {
    session_valid: bool,
    refresh_valid: bool,
    collections: BTreeMap<&'static str, BTreeMap<String, Value>>,
    failing: HashSet<String>,
    next_id: u64,
}

pub struct FakeBackendTransport {
    routes: FakeAuthRoutes,
    state: Mutex<FakeState>,
    refresh_calls: AtomicUsize,
}

impl FakeBackendTransport {
    pub fn new(routes: FakeAuthRoutes) -> Self {
        let mut collections = BTreeMap::new();
        collections.insert("reviews", BTreeMap::new());
        collections.insert("forums", BTreeMap::new());
        Self {
            routes,
            state: Mutex::new(FakeState {
                session_valid: false,
                refresh_valid: false,
                collections,
                failing: HashSet::new(),
                next_id: 1,
            }),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    /// A backend with a live session and a few reviews and posts.
    pub fn seeded(routes: FakeAuthRoutes) -> Self {
        let backend = Self::new(routes);
        {
            let mut state = backend.lock();
            state.session_valid = true;
            state.refresh_valid = true;
            let now = Utc::now();
            for (target_type, target_id, content, rating, likes) in [
                ("lecturer", "lecturer-1", "Clear lectures, fair exams.", 5, 12),
                ("subject", "subject-42", "Heavy workload but worth it.", 4, 3),
            ] {
                let id = state.new_id("r");
                let review = json!({
                    "id": id,
                    "targetType": target_type,
                    "targetId": target_id,
                    "content": content,
                    "rating": rating,
                    "isAnonymous": false,
                    "likeCount": likes,
                    "isLiked": false,
                    "bookmarkCount": 0,
                    "isBookmarked": false,
                    "createdAt": now,
                });
                state.insert("reviews", id, review);
            }
            let id = state.new_id("f");
            let post = json!({
                "id": id,
                "title": "Study group for Compilers?",
                "content": "Anyone up for weekly sessions before the midterm?",
                "tags": ["compilers", "study-group"],
                "authorName": "Student",
                "commentCount": 2,
                "likeCount": 1,
                "isLiked": false,
                "bookmarkCount": 0,
                "isBookmarked": false,
                "createdAt": now,
            });
            state.insert("forums", id, post);
        }
        backend
    }

    /// Access cookie expires; the refresh cookie stays valid.
    pub fn expire_session(&self) {
        self.lock().session_valid = false;
    }

    /// Both cookies are gone; the next refresh fails.
    pub fn revoke_session(&self) {
        let mut state = self.lock();
        state.session_valid = false;
        state.refresh_valid = false;
    }

    /// Toggle calls on this entity id answer with a server error.
    pub fn fail_toggles_for(&self, id: &str) {
        self.lock().failing.insert(id.to_owned());
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn entity(&self, collection: &str, id: &str) -> Option<Value> {
        self.lock()
            .collections
            .get(collection)
            .and_then(|items| items.get(id).cloned())
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn route(&self, context: &RequestContext) -> HttpResponse {
        let request = &context.request;
        let path = request.path.as_str();
        let mut state = self.lock();

        if request.method == HttpMethod::Post && path == self.routes.login_path {
            return state.login(request.body.as_ref());
        }
        if request.method == HttpMethod::Post && path == self.routes.refresh_path {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if !state.refresh_valid {
                return failure(401, "refresh token expired");
            }
            state.session_valid = true;
            return success(Value::Null);
        }
        if request.method == HttpMethod::Post && path == self.routes.logout_path {
            state.session_valid = false;
            state.refresh_valid = false;
            return success(Value::Null);
        }
        if !state.session_valid {
            return failure(401, "access token expired");
        }
        if request.method == HttpMethod::Get && path == self.routes.me_path {
            return success(fake_user());
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let page = request
            .query
            .iter()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse::<u32>().ok())
            .unwrap_or(1);
        match (request.method, segments.as_slice()) {
            (HttpMethod::Get, ["bookmarks", collection]) => {
                state.list(collection, page, |item| flag(item, "isBookmarked"))
            }
            (HttpMethod::Get, [collection]) => state.list(collection, page, |_| true),
            (HttpMethod::Post, [collection]) => state.create(collection, request.body.as_ref()),
            (HttpMethod::Get, [collection, id]) => match state.get(collection, id) {
                Some(item) => success(item),
                None => failure(404, "not found"),
            },
            (HttpMethod::Patch, [collection, id]) => {
                state.edit(collection, id, request.body.as_ref())
            }
            (HttpMethod::Delete, [collection, id]) => state.delete(collection, id),
            (HttpMethod::Post, [collection, id, toggle]) => {
                state.toggle(collection, id, toggle, true)
            }
            (HttpMethod::Delete, [collection, id, toggle]) => {
                state.toggle(collection, id, toggle, false)
            }
            _ => failure(404, "no such route"),
        }
    }
}

impl FakeState {
    fn new_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{}", self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, collection: &'static str, id: String, item: Value) {
        if let Some(items) = self.collections.get_mut(collection) {
            items.insert(id, item);
        }
    }

    fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections.get(collection)?.get(id).cloned()
    }

    fn login(&mut self, body: Option<&Value>) -> HttpResponse {
        let field = |name: &str| body.and_then(|b| b.get(name)).and_then(Value::as_str);
        if field("email") == Some(FAKE_EMAIL) && field("password") == Some(FAKE_PASSWORD) {
            self.session_valid = true;
            self.refresh_valid = true;
            success(fake_user())
        } else {
            failure(401, "invalid email or password")
        }
    }

    fn list(&self, collection: &str, page: u32, keep: impl Fn(&Value) -> bool) -> HttpResponse {
        let Some(items) = self.collections.get(collection) else {
            return failure(404, "no such collection");
        };
        let items: Vec<Value> = items.values().filter(|&item| keep(item)).cloned().collect();
        success(json!({ "items": items, "page": page, "total": items.len() }))
    }

    fn create(&mut self, collection: &str, body: Option<&Value>) -> HttpResponse {
        let Some(key) = self.collections.keys().find(|k| **k == collection).copied() else {
            return failure(404, "no such collection");
        };
        let Some(Value::Object(fields)) = body.cloned() else {
            return failure(400, "body must be an object");
        };
        let id = self.new_id(&key[..1]);
        let mut item = Map::new();
        item.insert("id".to_string(), json!(id));
        item.insert("likeCount".to_string(), json!(0));
        item.insert("isLiked".to_string(), json!(false));
        item.insert("bookmarkCount".to_string(), json!(0));
        item.insert("isBookmarked".to_string(), json!(false));
        item.insert("createdAt".to_string(), json!(Utc::now()));
        item.extend(fields);
        let item = Value::Object(item);
        self.insert(key, id, item.clone());
        success(item)
    }

    fn edit(&mut self, collection: &str, id: &str, body: Option<&Value>) -> HttpResponse {
        let Some(Value::Object(fields)) = body.cloned() else {
            return failure(400, "body must be an object");
        };
        let Some(Value::Object(item)) = self
            .collections
            .get_mut(collection)
            .and_then(|items| items.get_mut(id))
        else {
            return failure(404, "not found");
        };
        item.extend(fields);
        success(Value::Object(item.clone()))
    }

    fn delete(&mut self, collection: &str, id: &str) -> HttpResponse {
        match self
            .collections
            .get_mut(collection)
            .and_then(|items| items.remove(id))
        {
            Some(_) => success(Value::Null),
            None => failure(404, "not found"),
        }
    }

    fn toggle(&mut self, collection: &str, id: &str, toggle: &str, on: bool) -> HttpResponse {
        let (flag_field, count_field) = match toggle {
            "like" => ("isLiked", "likeCount"),
            "bookmark" => ("isBookmarked", "bookmarkCount"),
            _ => return failure(404, "no such route"),
        };
        if self.failing.contains(id) {
            return failure(500, "toggle failed");
        }
        let Some(Value::Object(item)) = self
            .collections
            .get_mut(collection)
            .and_then(|items| items.get_mut(id))
        else {
            return failure(404, "not found");
        };
        if item.get(flag_field).and_then(Value::as_bool).unwrap_or(false) == on {
            return failure(409, &format!("already {}", if on { toggle } else { "removed" }));
        }
        let count = item.get(count_field).and_then(Value::as_u64).unwrap_or(0);
        let count = if on { count + 1 } else { count.saturating_sub(1) };
        item.insert(flag_field.to_string(), json!(on));
        item.insert(count_field.to_string(), json!(count));
        success(json!({ count_field: count }))
    }
}

fn flag(item: &Value, field: &str) -> bool {
    item.get(field).and_then(Value::as_bool).unwrap_or(false)
}

fn fake_user() -> Value {
    json!({
        "id": "u1",
        "email": FAKE_EMAIL,
        "displayName": "Student",
        "role": "student",
    })
}

fn success(data: Value) -> HttpResponse {
    HttpResponse::json_body(200, &json!({ "success": true, "message": "ok", "data": data }))
}

fn failure(status: u16, message: &str) -> HttpResponse {
    HttpResponse::json_body(status, &json!({ "success": false, "message": message }))
}

#[async_trait::async_trait]
impl HttpTransport for FakeBackendTransport {
    async fn execute(&self, context: &RequestContext) -> Result<HttpResponse, TransportError> {
        let response = self.route(context);
        tracing::trace!(path = %context.request.path, status = response.status, "fake backend");
        Ok(response)
    }
}
