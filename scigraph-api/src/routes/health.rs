use salvo::prelude::*;

#[handler]
pub async fn ok() -> &'static str {
    "ok"
}
