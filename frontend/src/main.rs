mod app;
mod dom;
mod fetch;
mod pages;
mod speech;

use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(app::App);
}
