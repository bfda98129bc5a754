pub mod health;
pub mod objects;
pub mod schema;

use salvo::prelude::*;

use crate::state::AppState;

struct InjectState(AppState);

#[handler]
impl InjectState {
    async fn handle(&self, depot: &mut Depot) {
        depot.inject(self.0.clone());
    }
}

pub fn build(state: AppState) -> Router {
    let timeout = state
        .config
        .request_timeout()
        .expect("config validated request_timeout at load time");
    let max_body = state.config.max_body_bytes as u64;

    Router::new()
        .hoop(InjectState(state))
        .hoop(Timeout::new(timeout))
        .hoop(max_size(max_body))
        .get(health::ok)
        .push(
            Router::with_path("{db}")
                .get(objects::types_list)
                .push(Router::with_path("schema").get(schema::get_schema).post(schema::post_schema))
                .push(
                    Router::with_path("{type}")
                        .get(objects::object_list)
                        .post(objects::object_post)
                        .push(
                            Router::with_path("{id}")
                                .get(objects::object_get)
                                .patch(objects::object_patch)
                                .push(Router::with_path("clone").get(objects::object_clone))
                                .push(Router::with_path("safe-links").get(objects::object_safe_links))
                                .push(Router::with_path("graph").get(objects::object_graph)),
                        ),
                ),
        )
}
