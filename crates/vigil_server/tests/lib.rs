mod common;

mod api {
    mod health;
    mod iterate;
    mod metrics;
}
