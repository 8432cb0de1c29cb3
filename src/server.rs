use actix_web::{dev::Server, middleware, web, App, HttpServer};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    controller::{healthcheck, metrics},
    error::Error,
};

pub async fn server_task(app_state: &AppState<State>) -> Result<(), Error> {
    let app = app_state.clone();
    tokio::spawn(async move {
        let server = init_server(app)?;
        server.await?;
        Ok(())
    })
    .await?
}

pub fn configure(config: &mut web::ServiceConfig) {
    config.service(metrics::index).service(healthcheck::index);
}

fn init_server(app_state: AppState<State>) -> Result<Server, Error> {
    let listen_address = app_state.config.listen_address.to_owned();

    info!(parent: &app_state.span, "Listening on {}", listen_address);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(configure)
    })
    .bind(listen_address)?
    .run();
    Ok(server)
}
