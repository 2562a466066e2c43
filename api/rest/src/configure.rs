use actix_web::web;

use crate::{
    error_handler::{json_error_handler, path_error_handler, query_error_handler},
    service::{
        docs::docs_api, root::root_api, sales::sales_api, shop_unit::shop_unit_api,
        statistic::statistic_api,
    },
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .configure(root_api)
        .configure(docs_api)
        .configure(shop_unit_api)
        .configure(sales_api)
        .configure(statistic_api);
}
