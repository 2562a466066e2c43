use actix_web::{http::StatusCode, web, HttpResponse};
use gs_dao::{import, shop_unit::ShopUnitDao};
use gs_error::Error;
use validator::Validate;

use crate::{
    context::ApiRestCtx,
    model::{
        shop_unit::{ImportShopUnitsReqJson, ShopUnitNodeResJson, ShopUnitReqPath},
        Response,
    },
};

pub fn shop_unit_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/imports", web::post().to(import_many))
        .route("/delete/{id}", web::delete().to(delete_one))
        .route("/nodes/{id}", web::get().to(find_one));
}

async fn import_many(
    ctx: web::Data<ApiRestCtx>,
    data: web::Json<ImportShopUnitsReqJson>,
) -> HttpResponse {
    if let Err(err) = data.validate() {
        return Response::error(&Error::bad_request(err));
    }

    let items: Vec<_> = data.items().iter().map(|item| item.to_dao()).collect();

    if let Err(err) = import::db_import(ctx.dao().db(), &items, data.update_date()).await {
        return Response::error_anyhow(&err);
    }

    Response::empty(&StatusCode::OK)
}

async fn delete_one(ctx: web::Data<ApiRestCtx>, path: web::Path<ShopUnitReqPath>) -> HttpResponse {
    if let Err(err) = ShopUnitDao::db_delete(ctx.dao().db(), path.id()).await {
        return Response::error_anyhow(&err);
    }

    Response::empty(&StatusCode::OK)
}

async fn find_one(ctx: web::Data<ApiRestCtx>, path: web::Path<ShopUnitReqPath>) -> HttpResponse {
    let tree = match ShopUnitDao::db_select_tree(ctx.dao().db(), path.id()).await {
        Ok(tree) => tree,
        Err(err) => return Response::error_anyhow(&err),
    };

    Response::data(&StatusCode::OK, &ShopUnitNodeResJson::from_dao(&tree))
}
