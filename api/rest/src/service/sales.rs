use actix_web::{http::StatusCode, web, HttpResponse};
use gs_dao::shop_unit::ShopUnitDao;

use crate::{
    context::ApiRestCtx,
    model::{
        sales::SalesReqQuery,
        shop_unit::{ShopUnitStatisticResJson, ShopUnitStatisticUnitResJson},
        Response,
    },
};

pub fn sales_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/sales", web::get().to(find_many));
}

async fn find_many(ctx: web::Data<ApiRestCtx>, query: web::Query<SalesReqQuery>) -> HttpResponse {
    let sales = match ShopUnitDao::db_select_many_sales(ctx.dao().db(), query.date()).await {
        Ok(sales) => sales,
        Err(err) => return Response::error_anyhow(&err),
    };

    Response::data(
        &StatusCode::OK,
        &ShopUnitStatisticResJson::new(
            sales
                .iter()
                .map(ShopUnitStatisticUnitResJson::from_shop_unit_dao)
                .collect(),
        ),
    )
}
