use actix_web::{http::StatusCode, web, HttpResponse};
use gs_dao::shop_unit_statistic::ShopUnitStatisticDao;

use crate::{
    context::ApiRestCtx,
    model::{
        shop_unit::{ShopUnitReqPath, ShopUnitStatisticResJson, ShopUnitStatisticUnitResJson},
        statistic::StatisticReqQuery,
        Response,
    },
};

pub fn statistic_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/node/{id}/statistic", web::get().to(find_many));
}

async fn find_many(
    ctx: web::Data<ApiRestCtx>,
    path: web::Path<ShopUnitReqPath>,
    query: web::Query<StatisticReqQuery>,
) -> HttpResponse {
    let statistics = match ShopUnitStatisticDao::db_select_many_by_unit_id(
        ctx.dao().db(),
        path.id(),
        query.date_start(),
        query.date_end(),
    )
    .await
    {
        Ok(statistics) => statistics,
        Err(err) => return Response::error_anyhow(&err),
    };

    Response::data(
        &StatusCode::OK,
        &ShopUnitStatisticResJson::new(
            statistics
                .iter()
                .map(ShopUnitStatisticUnitResJson::from_statistic_dao)
                .collect(),
        ),
    )
}
