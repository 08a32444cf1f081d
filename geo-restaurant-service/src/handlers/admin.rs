//! HTML admin screens for browsing and editing restaurants.
//!
//! Forms reuse the serializer's validation so the admin and the JSON API
//! accept the same values. The geometry field is GeoJSON text backed by an
//! OpenLayers map: clicking the map adds a point.

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;
use tracing::{info, instrument, warn};

use crate::config::AdminCredentials;
use crate::error::ApiError;
use crate::geometry::MultiPointGeometry;
use crate::models::Restaurant;
use crate::serializer::{self, ValidationErrors, NON_FIELD_ERRORS};

use super::AppState;

const CHANGELIST_URL: &str = "/admin/geo/restaurant/";
const ADD_URL: &str = "/admin/geo/restaurant/add/";
const REALM: &str = "Basic realm=\"Restaurant administration\"";

pub fn router(state: AppState) -> Router<AppState> {
    if state.admin_credentials.is_none() {
        warn!("admin credentials not configured; admin screens are unauthenticated");
    }

    Router::new()
        .route("/admin/", get(index))
        .route(CHANGELIST_URL, get(changelist))
        .route(ADD_URL, get(add_form).post(add_restaurant))
        .route(
            "/admin/geo/restaurant/{id}/change/",
            get(change_form).post(change_restaurant),
        )
        .route(
            "/admin/geo/restaurant/{id}/delete/",
            get(delete_confirmation).post(delete_restaurant),
        )
        .route_layer(middleware::from_fn_with_state(state, require_staff))
        .route_layer(middleware::from_fn(reject_cross_site))
}

/// Refuses state-changing requests that a browser sent from another site.
async fn reject_cross_site(request: Request, next: Next) -> Response {
    if is_cross_site(request.method(), request.headers()) {
        warn!(method = %request.method(), uri = %request.uri(), "cross-site admin request refused");
        return (
            StatusCode::FORBIDDEN,
            page(
                "Forbidden",
                "",
                "<p>CSRF verification failed. Request aborted.</p>",
            ),
        )
            .into_response();
    }
    next.run(request).await
}

fn is_cross_site(method: &Method, headers: &HeaderMap) -> bool {
    if method.is_safe() {
        return false;
    }

    let header_str = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());

    if let Some(site) = header_str("sec-fetch-site") {
        if !matches!(site, "same-origin" | "none") {
            return true;
        }
    }

    // Non-browser clients send no Origin.
    let Some(origin) = header_str("origin") else {
        return false;
    };
    let origin_authority = origin
        .parse::<Uri>()
        .ok()
        .and_then(|uri| uri.authority().map(|a| a.as_str().to_ascii_lowercase()));
    let host = header_str("host").map(str::to_ascii_lowercase);

    match (origin_authority, host) {
        (Some(origin), Some(host)) => origin != host,
        _ => true,
    }
}

async fn require_staff(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(credentials) = state.admin_credentials.as_deref() else {
        return next.run(request).await;
    };

    if is_authorized(request.headers(), credentials) {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, REALM)],
            "Authentication required",
        )
            .into_response()
    }
}

fn is_authorized(headers: &HeaderMap, credentials: &AdminCredentials) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| BASE64.decode(encoded.trim()).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .and_then(|decoded| {
            decoded.split_once(':').map(|(username, password)| {
                let username_ok = username.as_bytes().ct_eq(credentials.username.as_bytes());
                let password_ok = password.as_bytes().ct_eq(credentials.password.as_bytes());
                bool::from(username_ok & password_ok)
            })
        })
        .unwrap_or(false)
}

/// Form fields as posted by the add/change screens. Empty inputs count as
/// missing.
#[derive(Debug, Default, Deserialize)]
pub struct RestaurantForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qualifications: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub ppoly: String,
    #[serde(rename = "_continue")]
    pub save_and_continue: Option<String>,
    #[serde(rename = "_addanother")]
    pub save_and_add_another: Option<String>,
}

impl RestaurantForm {
    fn from_restaurant(restaurant: &Restaurant) -> Self {
        Self {
            name: restaurant.name.clone(),
            qualifications: restaurant.qualifications.to_string(),
            owner: restaurant.owner.clone(),
            ppoly: serde_json::to_string(&MultiPointGeometry::from(&restaurant.ppoly))
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    fn to_data(&self) -> Value {
        let mut data = Map::new();
        for (key, value) in [
            ("name", &self.name),
            ("qualifications", &self.qualifications),
            ("owner", &self.owner),
            ("ppoly", &self.ppoly),
        ] {
            if !value.trim().is_empty() {
                data.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        Value::Object(data)
    }

    fn redirect_after_save(&self, id: i64) -> Redirect {
        if self.save_and_continue.is_some() {
            Redirect::to(&change_url(id))
        } else if self.save_and_add_another.is_some() {
            Redirect::to(ADD_URL)
        } else {
            Redirect::to(CHANGELIST_URL)
        }
    }
}

fn change_url(id: i64) -> String {
    format!("/admin/geo/restaurant/{id}/change/")
}

fn delete_url(id: i64) -> String {
    format!("/admin/geo/restaurant/{id}/delete/")
}

#[instrument]
pub async fn index() -> Html<String> {
    page(
        "Site administration",
        "",
        &format!(
            "<table><caption>Geo</caption>\
             <tr><th><a href=\"{CHANGELIST_URL}\">Restaurants</a></th>\
             <td><a href=\"{ADD_URL}\">Add</a></td>\
             <td><a href=\"{CHANGELIST_URL}\">Change</a></td></tr></table>"
        ),
    )
}

#[instrument(skip(state))]
pub async fn changelist(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let restaurants = state.with_repository(|repo| repo.list()).await?;

    let rows: String = restaurants
        .iter()
        .map(|r| {
            format!(
                "<tr><td><a href=\"{}\">{}</a></td></tr>",
                change_url(r.id),
                escape(&r.to_string())
            )
        })
        .collect();
    let count = match restaurants.len() {
        1 => "1 restaurant".to_string(),
        n => format!("{n} restaurants"),
    };

    Ok(page(
        "Select restaurant to change",
        "<a href=\"/admin/\">Home</a> &rsaquo; Restaurants",
        &format!(
            "<p><a class=\"button\" href=\"{ADD_URL}\">Add restaurant</a></p>\
             <table><thead><tr><th>Restaurant</th></tr></thead><tbody>{rows}</tbody></table>\
             <p>{count}</p>"
        ),
    ))
}

#[instrument]
pub async fn add_form() -> Html<String> {
    render_form(None, &RestaurantForm::default(), &ValidationErrors::default())
}

#[instrument(skip(state, form))]
pub async fn add_restaurant(
    State(state): State<AppState>,
    Form(form): Form<RestaurantForm>,
) -> Result<Response, ApiError> {
    let new_restaurant = match serializer::decode_new(&form.to_data()) {
        Ok(new_restaurant) => new_restaurant,
        Err(errors) => {
            return Ok((StatusCode::BAD_REQUEST, render_form(None, &form, &errors)).into_response())
        }
    };

    let restaurant = state
        .with_repository(move |repo| repo.create(&new_restaurant))
        .await?;
    info!(id = restaurant.id, %restaurant, "restaurant added from admin");

    Ok(form.redirect_after_save(restaurant.id).into_response())
}

#[instrument(skip(state))]
pub async fn change_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(restaurant) = find(&state, &id).await? else {
        return Ok(not_found());
    };

    Ok(render_form(
        Some(&restaurant),
        &RestaurantForm::from_restaurant(&restaurant),
        &ValidationErrors::default(),
    )
    .into_response())
}

#[instrument(skip(state, form))]
pub async fn change_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RestaurantForm>,
) -> Result<Response, ApiError> {
    let Some(restaurant) = find(&state, &id).await? else {
        return Ok(not_found());
    };

    let changes = match serializer::decode(&form.to_data(), false) {
        Ok(changes) => changes,
        Err(errors) => {
            return Ok(
                (StatusCode::BAD_REQUEST, render_form(Some(&restaurant), &form, &errors))
                    .into_response(),
            )
        }
    };

    let id = restaurant.id;
    let Some(updated) = state
        .with_repository(move |repo| repo.update(id, &changes))
        .await?
    else {
        return Ok(not_found());
    };
    info!(id, restaurant = %updated, "restaurant changed from admin");

    Ok(form.redirect_after_save(id).into_response())
}

#[instrument(skip(state))]
pub async fn delete_confirmation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(restaurant) = find(&state, &id).await? else {
        return Ok(not_found());
    };

    Ok(page(
        "Are you sure?",
        &breadcrumbs(Some(&restaurant)),
        &format!(
            "<p>Are you sure you want to delete the restaurant &ldquo;{}&rdquo;?</p>\
             <form method=\"post\" action=\"{}\">\
             <input type=\"submit\" value=\"Yes, I&rsquo;m sure\"> \
             <a href=\"{}\">No, take me back</a></form>",
            escape(&restaurant.to_string()),
            delete_url(restaurant.id),
            change_url(restaurant.id),
        ),
    )
    .into_response())
}

#[instrument(skip(state))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Ok(id) = id.parse::<i64>() else {
        return Ok(not_found());
    };

    if !state.with_repository(move |repo| repo.delete(id)).await? {
        return Ok(not_found());
    }
    info!(id, "restaurant deleted from admin");

    Ok(Redirect::to(CHANGELIST_URL).into_response())
}

async fn find(state: &AppState, raw_id: &str) -> Result<Option<Restaurant>, ApiError> {
    let Ok(id) = raw_id.parse::<i64>() else {
        return Ok(None);
    };
    state.with_repository(move |repo| repo.get(id)).await
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        page(
            "Not found",
            "<a href=\"/admin/\">Home</a>",
            "<p>The requested restaurant does not exist. Perhaps it was deleted?</p>",
        ),
    )
        .into_response()
}

fn breadcrumbs(restaurant: Option<&Restaurant>) -> String {
    let current = match restaurant {
        Some(r) => escape(&r.to_string()),
        None => "Add restaurant".to_string(),
    };
    format!(
        "<a href=\"/admin/\">Home</a> &rsaquo; <a href=\"{CHANGELIST_URL}\">Restaurants</a> &rsaquo; {current}"
    )
}

fn render_form(
    restaurant: Option<&Restaurant>,
    form: &RestaurantForm,
    errors: &ValidationErrors,
) -> Html<String> {
    let (title, action) = match restaurant {
        Some(r) => ("Change restaurant".to_string(), change_url(r.id)),
        None => ("Add restaurant".to_string(), ADD_URL.to_string()),
    };

    let summary = if errors.is_empty() {
        String::new()
    } else {
        "<p class=\"errornote\">Please correct the errors below.</p>".to_string()
    };
    let non_field = error_list(errors, NON_FIELD_ERRORS);

    let text_row = |field: &str, label: &str, value: &str, kind: &str| {
        format!(
            "<div class=\"form-row\">{}<label for=\"id_{field}\">{label}:</label>\
             <input type=\"{kind}\" name=\"{field}\" id=\"id_{field}\" value=\"{}\"></div>",
            error_list(errors, field),
            escape(value),
        )
    };

    let delete_link = match restaurant {
        Some(r) => format!(
            "<a class=\"deletelink\" href=\"{}\">Delete</a>",
            delete_url(r.id)
        ),
        None => String::new(),
    };

    page(
        &title,
        &breadcrumbs(restaurant),
        &format!(
            "{summary}{non_field}<form method=\"post\" action=\"{action}\">\
             {}{}{}\
             <div class=\"form-row\">{}<label for=\"id_ppoly\">Ppoly:</label>\
             <div id=\"id_ppoly_map\" class=\"map\"></div>\
             <a href=\"#\" id=\"id_ppoly_clear\">Delete all Features</a>\
             <textarea name=\"ppoly\" id=\"id_ppoly\" rows=\"4\" cols=\"80\">{}</textarea></div>\
             <div class=\"submit-row\">\
             <input type=\"submit\" value=\"Save\" name=\"_save\"> \
             <input type=\"submit\" value=\"Save and add another\" name=\"_addanother\"> \
             <input type=\"submit\" value=\"Save and continue editing\" name=\"_continue\"> \
             {delete_link}</div></form>\
             <script>{MAP_WIDGET_JS}</script>",
            text_row("name", "Name", &form.name, "text"),
            text_row("qualifications", "Qualifications", &form.qualifications, "number"),
            text_row("owner", "Owner", &form.owner, "text"),
            error_list(errors, "ppoly"),
            escape(&form.ppoly),
        ),
    )
}

fn error_list(errors: &ValidationErrors, field: &str) -> String {
    match errors.get(field) {
        Some(messages) if !messages.is_empty() => {
            let items: String = messages
                .iter()
                .map(|m| format!("<li>{}</li>", escape(m)))
                .collect();
            format!("<ul class=\"errorlist\">{items}</ul>")
        }
        _ => String::new(),
    }
}

fn page(title: &str, breadcrumbs: &str, content: &str) -> Html<String> {
    let nav = if breadcrumbs.is_empty() {
        String::new()
    } else {
        format!("<div class=\"breadcrumbs\">{breadcrumbs}</div>")
    };
    Html(format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title} | Restaurant administration</title>\
         <link rel=\"stylesheet\" href=\"{OPENLAYERS_CSS}\">\
         <script src=\"{OPENLAYERS_JS}\"></script>\
         <style>{ADMIN_CSS}</style></head><body>\
         <header><a href=\"/admin/\">Restaurant administration</a></header>{nav}\
         <main><h1>{title}</h1>{content}</main></body></html>"
    ))
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const OPENLAYERS_CSS: &str = "https://cdn.jsdelivr.net/npm/ol@v7.5.2/ol.css";
const OPENLAYERS_JS: &str = "https://cdn.jsdelivr.net/npm/ol@v7.5.2/dist/ol.js";

const ADMIN_CSS: &str = "\
body{margin:0;font-family:sans-serif;font-size:14px;color:#333}\
header{background:#417690;padding:10px 40px}header a{color:#f5dd5d;font-size:18px;text-decoration:none}\
.breadcrumbs{background:#79aec8;padding:10px 40px;color:#c4dce8}.breadcrumbs a{color:#fff}\
main{padding:20px 40px}table{border-collapse:collapse;min-width:300px}\
th,td{border-bottom:1px solid #eee;padding:8px;text-align:left}\
.form-row{padding:8px 0;border-bottom:1px solid #eee}label{display:inline-block;width:160px;font-weight:bold}\
.map{width:600px;height:400px;margin:8px 0;border:1px solid #ccc}\
.errornote,.errorlist{color:#ba2121}.errorlist{margin:0 0 4px;padding-left:16px}\
.submit-row{padding:12px;background:#f8f8f8;margin-top:12px}.deletelink{color:#ba2121;float:right}";

const MAP_WIDGET_JS: &str = r#"
(function () {
  var field = document.getElementById('id_ppoly');
  if (!field || typeof ol === 'undefined') { return; }
  var format = new ol.format.GeoJSON({dataProjection: 'EPSG:4326', featureProjection: 'EPSG:3857'});
  var source = new ol.source.Vector();
  var map = new ol.Map({
    target: 'id_ppoly_map',
    layers: [new ol.layer.Tile({source: new ol.source.OSM()}), new ol.layer.Vector({source: source})],
    view: new ol.View({center: ol.proj.fromLonLat([0, 0]), zoom: 2})
  });
  function load() {
    source.clear();
    if (!field.value.trim()) { return; }
    try {
      format.readGeometry(field.value).getPoints().forEach(function (point) {
        source.addFeature(new ol.Feature(point));
      });
      map.getView().fit(source.getExtent(), {maxZoom: 16, padding: [40, 40, 40, 40]});
    } catch (e) {}
  }
  function store() {
    var points = source.getFeatures().map(function (f) { return f.getGeometry().getCoordinates(); });
    field.value = points.length ? format.writeGeometry(new ol.geom.MultiPoint(points), {decimals: 7}) : '';
  }
  map.on('click', function (event) {
    source.addFeature(new ol.Feature(new ol.geom.Point(event.coordinate)));
    store();
  });
  document.getElementById('id_ppoly_clear').addEventListener('click', function (event) {
    event.preventDefault();
    source.clear();
    store();
  });
  field.addEventListener('change', load);
  load();
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::*;
    use crate::repository::RestaurantRepository;
    use axum::body::Body;
    use axum::http::Request;

    const PPOLY: &str = r#"{"type":"MultiPoint","coordinates":[[-3.7,40.4]]}"#;

    fn form_request(uri: &str, pairs: &[(&str, &str)]) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(pairs).unwrap()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn location(response: &Response<Body>) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#x27;s&quot;&lt;/b&gt;"
        );
    }

    #[tokio::test]
    async fn test_add_restaurant() {
        let (app, repository) = test_app(None);

        let response = send(
            &app,
            form_request(
                ADD_URL,
                &[
                    ("name", "Cafe Luna"),
                    ("qualifications", "4"),
                    ("owner", "Ana"),
                    ("ppoly", PPOLY),
                    ("_save", "Save"),
                ],
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), CHANGELIST_URL);
        let restaurants = repository.list().unwrap();
        assert_eq!(restaurants.len(), 1);
        assert_eq!(restaurants[0].name, "Cafe Luna");
        assert_eq!(restaurants[0].qualifications, 4);

        let response = send(&app, get(CHANGELIST_URL)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Cafe Luna"));
        assert!(html.contains("1 restaurant"));
    }

    #[tokio::test]
    async fn test_add_restaurant_with_errors() {
        let (app, repository) = test_app(None);

        let response = send(
            &app,
            form_request(
                ADD_URL,
                &[("name", "<Cafe>"), ("qualifications", "four"), ("owner", "")],
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Please correct the errors below."));
        assert!(html.contains("A valid integer is required."));
        assert!(html.contains("This field is required."));
        assert!(html.contains("value=\"&lt;Cafe&gt;\""));
        assert_eq!(repository.len(), 0);
    }

    #[tokio::test]
    async fn test_change_restaurant() {
        let (app, repository) = test_app(None);
        send(
            &app,
            form_request(
                ADD_URL,
                &[
                    ("name", "Cafe Luna"),
                    ("qualifications", "4"),
                    ("owner", "Ana"),
                    ("ppoly", PPOLY),
                ],
            ),
        )
        .await;
        let id = repository.list().unwrap()[0].id;

        let response = send(&app, get(&change_url(id))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("value=\"Cafe Luna\""));
        assert!(html.contains(&escape(PPOLY)));

        let response = send(
            &app,
            form_request(
                &change_url(id),
                &[
                    ("name", "Cafe Sol"),
                    ("qualifications", "5"),
                    ("owner", "Ana"),
                    ("ppoly", PPOLY),
                    ("_continue", "Save and continue editing"),
                ],
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), change_url(id));
        let restaurant = repository.get(id).unwrap().unwrap();
        assert_eq!(restaurant.name, "Cafe Sol");
        assert_eq!(restaurant.qualifications, 5);
    }

    #[tokio::test]
    async fn test_delete_restaurant() {
        let (app, repository) = test_app(None);
        send(
            &app,
            form_request(
                ADD_URL,
                &[
                    ("name", "Cafe Luna"),
                    ("qualifications", "4"),
                    ("owner", "Ana"),
                    ("ppoly", PPOLY),
                ],
            ),
        )
        .await;
        let id = repository.list().unwrap()[0].id;

        let response = send(&app, get(&delete_url(id))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response)
            .await
            .contains("Are you sure you want to delete the restaurant &ldquo;Cafe Luna&rdquo;?"));

        let response = send(&app, form_request(&delete_url(id), &[])).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(repository.len(), 0);

        let response = send(&app, get(&change_url(id))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_basic_auth_required_when_configured() {
        let (app, _) = test_app(Some(AdminCredentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }));

        let response = send(&app, get("/admin/")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            REALM
        );

        let wrong = format!("Basic {}", BASE64.encode("admin:nope"));
        let response = send(
            &app,
            Request::get("/admin/")
                .header(header::AUTHORIZATION, wrong)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let right = format!("Basic {}", BASE64.encode("admin:secret"));
        let response = send(
            &app,
            Request::get("/admin/")
                .header(header::AUTHORIZATION, right)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        // The JSON API stays open.
        let response = send(&app, get("/restaurant/")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_is_cross_site() {
        let headers = |pairs: &[(&'static str, &'static str)]| {
            let mut map = HeaderMap::new();
            for (name, value) in pairs {
                map.insert(*name, value.parse().unwrap());
            }
            map
        };

        assert!(!is_cross_site(&Method::POST, &headers(&[])));
        assert!(!is_cross_site(
            &Method::GET,
            &headers(&[("sec-fetch-site", "cross-site")])
        ));
        assert!(is_cross_site(
            &Method::POST,
            &headers(&[("sec-fetch-site", "cross-site")])
        ));
        assert!(is_cross_site(
            &Method::POST,
            &headers(&[("sec-fetch-site", "same-site")])
        ));
        assert!(!is_cross_site(
            &Method::POST,
            &headers(&[("sec-fetch-site", "same-origin")])
        ));
        assert!(!is_cross_site(
            &Method::POST,
            &headers(&[("origin", "http://localhost:8000"), ("host", "localhost:8000")])
        ));
        assert!(is_cross_site(
            &Method::POST,
            &headers(&[("origin", "https://evil.example"), ("host", "localhost:8000")])
        ));
        assert!(is_cross_site(
            &Method::POST,
            &headers(&[("origin", "null"), ("host", "localhost:8000")])
        ));
    }

    #[tokio::test]
    async fn test_cross_site_post_is_refused() {
        let (app, repository) = test_app(Some(AdminCredentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }));
        let authorization = format!("Basic {}", BASE64.encode("admin:secret"));
        let created = repository
            .create(
                &serializer::decode_new(&serde_json::json!({
                    "name": "Cafe Luna",
                    "qualifications": 4,
                    "owner": "Ana",
                    "ppoly": PPOLY,
                }))
                .unwrap(),
            )
            .unwrap();

        let response = send(
            &app,
            Request::post(delete_url(created.id))
                .header(header::AUTHORIZATION, &authorization)
                .header(header::HOST, "localhost:8000")
                .header(header::ORIGIN, "https://evil.example")
                .header("sec-fetch-site", "cross-site")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(repository.len(), 1);

        let response = send(
            &app,
            Request::post(delete_url(created.id))
                .header(header::AUTHORIZATION, &authorization)
                .header(header::HOST, "localhost:8000")
                .header(header::ORIGIN, "http://localhost:8000")
                .header("sec-fetch-site", "same-origin")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(repository.len(), 0);
    }
}
