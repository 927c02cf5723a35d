use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpRequest, HttpResponse, ResponseError};
use askama::Template;
use uuid::Uuid;

use super::{render, see_other};
use crate::dto::{EventFormData, EventWithAttendees, EventWithCreator, NewRsvpDto, RsvpFormData,
    RsvpWithEvent, RsvpWithUser, UpdateRsvpDto};
use crate::errors::ApiError;
use crate::service::{self, auth::CurrentUser};
use crate::PGPool;

#[derive(Template)]
#[template(path = "events_list.html")]
struct EventsListTemplate<'a> {
    user: Option<&'a CurrentUser>,
    events: &'a [EventWithCreator],
}

#[derive(Template)]
#[template(path = "event_detail.html")]
struct EventDetailTemplate<'a> {
    user: Option<&'a CurrentUser>,
    event: &'a EventWithCreator,
    rsvps: &'a [RsvpWithUser],
    attending_count: usize,
    user_rsvp: Option<&'a RsvpWithUser>,
}

#[derive(Template)]
#[template(path = "event_form.html")]
struct EventFormTemplate<'a> {
    user: Option<&'a CurrentUser>,
    error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "my_events.html")]
struct MyEventsTemplate<'a> {
    user: Option<&'a CurrentUser>,
    events: &'a [EventWithAttendees],
}

#[derive(Template)]
#[template(path = "my_rsvps.html")]
struct MyRsvpsTemplate<'a> {
    user: Option<&'a CurrentUser>,
    rsvps: &'a [RsvpWithEvent],
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    user: Option<&'a CurrentUser>,
    message: &'a str,
}

fn error_page(user: Option<&CurrentUser>, err: &ApiError) -> HttpResponse {
    render(
        err.status_code(),
        &ErrorTemplate {
            user,
            message: &err.to_string(),
        },
    )
}

#[get("/")]
pub async fn index(req: HttpRequest, pool_state: web::Data<PGPool>) -> HttpResponse {
    let user = service::auth::current_user(&req);
    match service::event::get_all(pool_state.get_ref()).await {
        Ok(events) => render(
            StatusCode::OK,
            &EventsListTemplate {
                user: user.as_ref(),
                events: &events,
            },
        ),
        Err(err) => error_page(user.as_ref(), &err),
    }
}

#[get("/events/new")]
pub async fn new_event_page(req: HttpRequest) -> HttpResponse {
    let Some(user) = service::auth::current_user(&req) else {
        return see_other("/auth/login");
    };
    render(
        StatusCode::OK,
        &EventFormTemplate {
            user: Some(&user),
            error: None,
        },
    )
}

#[post("/events/new")]
pub async fn create_event(
    req: HttpRequest,
    form: web::Form<EventFormData>,
    pool_state: web::Data<PGPool>,
) -> HttpResponse {
    let Some(user) = service::auth::current_user(&req) else {
        return see_other("/auth/login");
    };
    let dto = match form.into_inner().into_new_event() {
        Ok(dto) => dto,
        Err(err) => {
            return render(
                StatusCode::BAD_REQUEST,
                &EventFormTemplate {
                    user: Some(&user),
                    error: Some(&err.to_string()),
                },
            )
        }
    };
    match service::event::create(pool_state.get_ref(), &user, dto).await {
        Ok(_) => see_other("/"),
        Err(err) => render(
            StatusCode::BAD_REQUEST,
            &EventFormTemplate {
                user: Some(&user),
                error: Some(&err.to_string()),
            },
        ),
    }
}

#[get("/events/{id}")]
pub async fn event_detail(
    req: HttpRequest,
    id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> HttpResponse {
    let user = service::auth::current_user(&req);
    let pool = pool_state.get_ref();
    let event_id = id.into_inner();

    let event = match service::event::get_with_creator(pool, event_id).await {
        Ok(event) => event,
        Err(err) => return error_page(user.as_ref(), &err),
    };
    let rsvps = match service::rsvp::get_by_event(pool, event_id).await {
        Ok(rsvps) => rsvps,
        Err(err) => return error_page(user.as_ref(), &err),
    };
    let attending_count = rsvps.iter().filter(|r| r.status.is_attending()).count();
    let user_rsvp = user
        .as_ref()
        .and_then(|u| rsvps.iter().find(|r| r.user.id == u.id));

    render(
        StatusCode::OK,
        &EventDetailTemplate {
            user: user.as_ref(),
            event: &event,
            rsvps: &rsvps,
            attending_count,
            user_rsvp,
        },
    )
}

#[post("/events/{id}/rsvp")]
pub async fn rsvp_to_event(
    req: HttpRequest,
    id: web::Path<Uuid>,
    form: web::Form<RsvpFormData>,
    pool_state: web::Data<PGPool>,
) -> HttpResponse {
    let Some(user) = service::auth::current_user(&req) else {
        return see_other("/auth/login");
    };
    let event_id = id.into_inner();
    let dto = NewRsvpDto {
        status: form.status,
    };
    match service::rsvp::create(pool_state.get_ref(), &user, event_id, dto).await {
        Ok(_) => see_other(&format!("/events/{}", event_id)),
        Err(err) => error_page(Some(&user), &err),
    }
}

#[post("/events/{event_id}/rsvp/{rsvp_id}")]
pub async fn update_rsvp(
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Form<RsvpFormData>,
    pool_state: web::Data<PGPool>,
) -> HttpResponse {
    let Some(user) = service::auth::current_user(&req) else {
        return see_other("/auth/login");
    };
    let (event_id, rsvp_id) = path.into_inner();
    let dto = UpdateRsvpDto {
        status: form.status,
    };
    match service::rsvp::update(pool_state.get_ref(), &user, rsvp_id, dto).await {
        Ok(_) => see_other(&format!("/events/{}", event_id)),
        Err(err) => error_page(Some(&user), &err),
    }
}

#[post("/events/{event_id}/rsvp/{rsvp_id}/delete")]
pub async fn delete_rsvp(
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    pool_state: web::Data<PGPool>,
) -> HttpResponse {
    let Some(user) = service::auth::current_user(&req) else {
        return see_other("/auth/login");
    };
    let (event_id, rsvp_id) = path.into_inner();
    match service::rsvp::delete(pool_state.get_ref(), &user, rsvp_id).await {
        Ok(()) => see_other(&format!("/events/{}", event_id)),
        Err(err) => error_page(Some(&user), &err),
    }
}

#[get("/my-events")]
pub async fn my_events(req: HttpRequest, pool_state: web::Data<PGPool>) -> HttpResponse {
    let Some(user) = service::auth::current_user(&req) else {
        return see_other("/auth/login");
    };
    match service::event::get_created_by(pool_state.get_ref(), &user).await {
        Ok(events) => render(
            StatusCode::OK,
            &MyEventsTemplate {
                user: Some(&user),
                events: &events,
            },
        ),
        Err(err) => error_page(Some(&user), &err),
    }
}

#[get("/my-rsvps")]
pub async fn my_rsvps(req: HttpRequest, pool_state: web::Data<PGPool>) -> HttpResponse {
    let Some(user) = service::auth::current_user(&req) else {
        return see_other("/auth/login");
    };
    match service::rsvp::get_my(pool_state.get_ref(), &user).await {
        Ok(rsvps) => render(
            StatusCode::OK,
            &MyRsvpsTemplate {
                user: Some(&user),
                rsvps: &rsvps,
            },
        ),
        Err(err) => error_page(Some(&user), &err),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(index);
    // the creation form registers before the detail page so "new" is not
    // taken for an event id
    cfg.service(new_event_page);
    cfg.service(create_event);
    cfg.service(event_detail);
    cfg.service(rsvp_to_event);
    cfg.service(update_rsvp);
    cfg.service(delete_rsvp);
    cfg.service(my_events);
    cfg.service(my_rsvps);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::UserProfile;
    use crate::models::RsvpStatus;
    use chrono::Utc;

    fn sample_user() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn sample_event(capacity: Option<i32>) -> EventWithCreator {
        EventWithCreator {
            id: Uuid::new_v4(),
            name: "Rust meetup".to_string(),
            location: "Berlin".to_string(),
            date: "2026-09-01".to_string(),
            capacity,
            created_by: UserProfile {
                id: Uuid::new_v4(),
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_rsvp(event_id: Uuid, user: &UserProfile, status: RsvpStatus) -> RsvpWithUser {
        RsvpWithUser {
            id: Uuid::new_v4(),
            event_id,
            status,
            user: user.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn events_list_renders_names_and_hosts() {
        let events = vec![sample_event(Some(10))];
        let html = EventsListTemplate {
            user: None,
            events: &events,
        }
        .render()
        .unwrap();
        assert!(html.contains("Rust meetup"));
        assert!(html.contains("Grace"));
        assert!(html.contains("capacity 10"));
    }

    #[test]
    fn detail_page_shows_the_attendee_count_against_capacity() {
        let event = sample_event(Some(2));
        let attendee = UserProfile {
            id: Uuid::new_v4(),
            name: "Linus".to_string(),
            email: "linus@example.com".to_string(),
        };
        let rsvps = vec![sample_rsvp(event.id, &attendee, RsvpStatus::Attending)];
        let html = EventDetailTemplate {
            user: None,
            event: &event,
            rsvps: &rsvps,
            attending_count: 1,
            user_rsvp: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("1 / 2 attending"));
        assert!(html.contains("Linus"));
        assert!(html.contains("Log in"));
    }

    #[test]
    fn detail_page_offers_rsvp_controls_to_a_signed_in_user() {
        let user = sample_user();
        let event = sample_event(None);
        let html = EventDetailTemplate {
            user: Some(&user),
            event: &event,
            rsvps: &[],
            attending_count: 0,
            user_rsvp: None,
        }
        .render()
        .unwrap();
        assert!(html.contains(&format!("/events/{}/rsvp", event.id)));
        assert!(html.contains("Attending"));
    }

    #[test]
    fn detail_page_surfaces_the_callers_own_rsvp_for_editing() {
        let user = sample_user();
        let event = sample_event(None);
        let profile = UserProfile {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        };
        let rsvps = vec![sample_rsvp(event.id, &profile, RsvpStatus::Declined)];
        let html = EventDetailTemplate {
            user: Some(&user),
            event: &event,
            rsvps: &rsvps,
            attending_count: 0,
            user_rsvp: rsvps.first(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Update RSVP"));
        assert!(html.contains("Remove RSVP"));
        assert!(html.contains(&format!("/events/{}/rsvp/{}", event.id, rsvps[0].id)));
    }

    #[test]
    fn form_errors_are_rendered_back_into_the_page() {
        let user = sample_user();
        let html = EventFormTemplate {
            user: Some(&user),
            error: Some("event is at full capacity"),
        }
        .render()
        .unwrap();
        assert!(html.contains("event is at full capacity"));
    }

    #[test]
    fn error_page_renders_the_message() {
        let html = ErrorTemplate {
            user: None,
            message: "not found",
        }
        .render()
        .unwrap();
        assert!(html.contains("not found"));
    }
}
