//! Executive summary dashboard: KPI cards plus the headline charts.
//!
//! Runs thirteen read-only aggregation statements against the warehouse
//! snapshot/ledger tables and bundles them into one response. Statements are
//! awaited sequentially; the first failure aborts the whole batch so the
//! client never sees a partial report.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;

/// Full payload for `GET /api/dashboard/summary`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub kpi: SummaryKpi,
    pub shortage_top5: Vec<ShortageAlert>,
    pub monthly_sales: Vec<MonthlySales>,
    pub sales_by_product_group: Vec<ProductGroupSales>,
    pub sales_by_product_type: Vec<ProductTypeSales>,
    pub inventory_by_status: Vec<InventoryStatusValue>,
    pub abc_inventory: AbcInventory,
    pub top_customers: Vec<CustomerSales>,
    pub inventory_trend: Vec<InventoryTrendPoint>,
    pub order_fulfillment: OrderFulfillment,
}

/// Headline KPI card values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryKpi {
    pub total_inventory_value: Decimal,
    pub total_inventory_quantity: Decimal,
    pub current_month_sales: Decimal,
    pub active_materials: i64,
    pub avg_turnover_rate: Decimal,
    pub slow_moving_count: i64,
    pub obsolete_count: i64,
    pub fulfillment_rate: Decimal,
}

/// Top-5 shortage alert joined against stock and materials master.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ShortageAlert {
    pub material: Option<String>,
    pub material_name: Option<String>,
    pub shortage_qty: i64,
    pub order_count: i64,
    pub avg_order_qty: Decimal,
    pub available_stock: Decimal,
    pub stock_value: Decimal,
    pub unit: Decimal,
    pub product_group: String,
}

/// One month of billing totals for the year-to-date trend chart.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MonthlySales {
    pub month: String,
    pub sales: Decimal,
}

/// Current-month sales grouped by product group (자재그룹7명).
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductGroupSales {
    pub product_group: String,
    pub total_sales: Decimal,
    pub material_count: i64,
    pub transaction_count: i64,
}

/// Current-month sales grouped by product type (자재그룹6명).
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductTypeSales {
    pub product_type: String,
    pub total_sales: Decimal,
    pub material_count: i64,
}

/// Stock value grouped by inventory status classification.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct InventoryStatusValue {
    pub inventory_status: String,
    pub total_value: Decimal,
    pub total_quantity: Decimal,
    pub material_count: i64,
}

/// ABC grade bucket totals across the whole snapshot.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AbcInventory {
    pub a_grade_value: Decimal,
    pub b_grade_value: Decimal,
    pub c_grade_value: Decimal,
    pub d_grade_value: Decimal,
    pub total_grade_value: Decimal,
}

/// Top-10 customer by billing total.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CustomerSales {
    pub customer: String,
    pub total_sales: Decimal,
    pub invoice_count: i64,
}

/// One age bucket (LT3M..LT24M) of the stock aging trend.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct InventoryTrendPoint {
    pub period: String,
    pub quantity: Decimal,
    pub amount: Decimal,
}

/// Order fulfillment rate across all open order lines.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct OrderFulfillment {
    pub fulfillment_rate: Decimal,
    pub total_orders: i64,
    pub completed_orders: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct InventoryTotals {
    total_inventory_value: Decimal,
    total_inventory_quantity: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct TurnoverStats {
    avg_turnover_rate: Decimal,
    slow_moving_count: i64,
    obsolete_count: i64,
}

/// Run the full summary battery. Any statement failure aborts the batch.
pub async fn get_report(pool: &PgPool) -> Result<SummaryReport, AppError> {
    let inventory_totals = fetch_inventory_totals(pool).await?;
    let current_month_sales = fetch_current_month_sales(pool).await?;
    let shortage_top5 = fetch_shortage_top5(pool).await?;
    let active_materials = fetch_active_materials(pool).await?;
    let monthly_sales = fetch_monthly_sales(pool).await?;
    let sales_by_product_group = fetch_sales_by_product_group(pool).await?;
    let sales_by_product_type = fetch_sales_by_product_type(pool).await?;
    let inventory_by_status = fetch_inventory_by_status(pool).await?;
    let turnover = fetch_turnover_stats(pool).await?;
    let abc_inventory = fetch_abc_inventory(pool).await?;
    let order_fulfillment = fetch_order_fulfillment(pool).await?;
    let top_customers = fetch_top_customers(pool).await?;
    let inventory_trend = fetch_inventory_trend(pool).await?;

    Ok(SummaryReport {
        kpi: SummaryKpi {
            total_inventory_value: inventory_totals.total_inventory_value,
            total_inventory_quantity: inventory_totals.total_inventory_quantity,
            current_month_sales,
            active_materials,
            avg_turnover_rate: turnover.avg_turnover_rate,
            slow_moving_count: turnover.slow_moving_count,
            obsolete_count: turnover.obsolete_count,
            fulfillment_rate: order_fulfillment.fulfillment_rate,
        },
        shortage_top5,
        monthly_sales,
        sales_by_product_group,
        sales_by_product_type,
        inventory_by_status,
        abc_inventory,
        top_customers,
        inventory_trend,
        order_fulfillment,
    })
}

/// Total inventory value and quantity across the snapshot.
async fn fetch_inventory_totals(pool: &PgPool) -> Result<InventoryTotals, AppError> {
    let row = sqlx::query_as::<_, InventoryTotals>(
        r#"
        SELECT
            COALESCE(SUM(CAST("재고금액" AS DECIMAL)), 0) AS total_inventory_value,
            COALESCE(SUM(CAST("총재고수량" AS DECIMAL)), 0) AS total_inventory_quantity
        FROM sap_zmmr0016_inventory
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Billed amount for the current calendar month.
async fn fetch_current_month_sales(pool: &PgPool) -> Result<Decimal, AppError> {
    let total = sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0)
        FROM sap_zsdr0340_sales_detail
        WHERE DATE_TRUNC('month', TO_DATE("청구일", 'YYYY-MM-DD')) = DATE_TRUNC('month', CURRENT_DATE)
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(total)
}

/// Top-5 materials by shortage quantity, enriched with stock and unit info.
async fn fetch_shortage_top5(pool: &PgPool) -> Result<Vec<ShortageAlert>, AppError> {
    let rows = sqlx::query_as::<_, ShortageAlert>(
        r#"
        WITH shortage_materials AS (
            SELECT
                o."자재" AS material,
                o."자재내역" AS material_name,
                SUM(CAST(o."오더수량" AS INTEGER) - CAST(o."납품가능수량" AS INTEGER)) AS shortage_qty,
                COUNT(*) AS order_count,
                AVG(CAST(o."오더수량" AS INTEGER)) AS avg_order_qty
            FROM sap_zsdr0062_sales_orders o
            WHERE CAST(o."오더수량" AS INTEGER) > CAST(o."납품가능수량" AS INTEGER)
            GROUP BY o."자재", o."자재내역"
            ORDER BY shortage_qty DESC
            LIMIT 5
        )
        SELECT
            s.material,
            s.material_name,
            s.shortage_qty,
            s.order_count,
            s.avg_order_qty,
            COALESCE(i."가용재고수량", 0) AS available_stock,
            COALESCE(i."재고금액", 0) AS stock_value,
            COALESCE(m."판매단위", 0) AS unit,
            COALESCE(m."자재그룹7명", '') AS product_group
        FROM shortage_materials s
        LEFT JOIN sap_zmmr0016_inventory i ON s.material = i."자재"
        LEFT JOIN sap_zmmr0001_materials m ON s.material = m."자재"
        ORDER BY s.shortage_qty DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Count of materials not flagged as discontinued.
async fn fetch_active_materials(pool: &PgPool) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT "자재")
        FROM sap_zmmr0001_materials
        WHERE "단종여부" IS NULL OR "단종여부" != '1'
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Monthly billing totals for the current year.
async fn fetch_monthly_sales(pool: &PgPool) -> Result<Vec<MonthlySales>, AppError> {
    let rows = sqlx::query_as::<_, MonthlySales>(
        r#"
        SELECT
            TO_CHAR(TO_DATE("청구일", 'YYYY-MM-DD'), 'YYYY-MM') AS month,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS sales
        FROM sap_zsdr0340_sales_detail
        WHERE TO_DATE("청구일", 'YYYY-MM-DD') >= DATE_TRUNC('year', CURRENT_DATE)
        GROUP BY TO_CHAR(TO_DATE("청구일", 'YYYY-MM-DD'), 'YYYY-MM')
        ORDER BY month
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Current-month sales grouped by product group, blanks bucketed as 기타.
async fn fetch_sales_by_product_group(pool: &PgPool) -> Result<Vec<ProductGroupSales>, AppError> {
    let rows = sqlx::query_as::<_, ProductGroupSales>(
        r#"
        SELECT
            COALESCE(NULLIF(TRIM("자재그룹7명"), ''), '기타') AS product_group,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS total_sales,
            COUNT(DISTINCT "자재") AS material_count,
            COUNT(*) AS transaction_count
        FROM sap_zsdr0340_sales_detail
        WHERE TO_DATE("청구일", 'YYYY-MM-DD') >= DATE_TRUNC('month', CURRENT_DATE)
        GROUP BY COALESCE(NULLIF(TRIM("자재그룹7명"), ''), '기타')
        HAVING SUM(CAST("청구금액" AS DECIMAL)) > 0
        ORDER BY total_sales DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Current-month sales grouped by product type.
async fn fetch_sales_by_product_type(pool: &PgPool) -> Result<Vec<ProductTypeSales>, AppError> {
    let rows = sqlx::query_as::<_, ProductTypeSales>(
        r#"
        SELECT
            COALESCE("자재그룹6명", '기타') AS product_type,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS total_sales,
            COUNT(DISTINCT "자재") AS material_count
        FROM sap_zsdr0340_sales_detail
        WHERE TO_DATE("청구일", 'YYYY-MM-DD') >= DATE_TRUNC('month', CURRENT_DATE)
            AND "자재그룹6명" IS NOT NULL
        GROUP BY COALESCE("자재그룹6명", '기타')
        ORDER BY total_sales DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Stock value grouped by inventory status classification.
async fn fetch_inventory_by_status(pool: &PgPool) -> Result<Vec<InventoryStatusValue>, AppError> {
    let rows = sqlx::query_as::<_, InventoryStatusValue>(
        r#"
        SELECT
            COALESCE("재고구분명", '기타') AS inventory_status,
            COALESCE(SUM(CAST("재고금액" AS DECIMAL)), 0) AS total_value,
            COALESCE(SUM(CAST("총재고수량" AS DECIMAL)), 0) AS total_quantity,
            COUNT(DISTINCT "자재") AS material_count
        FROM sap_zmmr0016_inventory
        WHERE "재고구분명" IS NOT NULL
        GROUP BY COALESCE("재고구분명", '기타')
        ORDER BY total_value DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Average turnover rate plus slow-moving and obsolete item counts.
///
/// Turnover approximates annualized sales over stock value: the 6-month
/// average sales amount doubled, divided by the current stock value.
async fn fetch_turnover_stats(pool: &PgPool) -> Result<TurnoverStats, AppError> {
    let row = sqlx::query_as::<_, TurnoverStats>(
        r#"
        SELECT
            COALESCE(AVG(CASE
                WHEN CAST("재고금액" AS DECIMAL) > 0
                THEN COALESCE(CAST("6개월평균판매금액" AS DECIMAL), 0) * 2 / CAST("재고금액" AS DECIMAL)
                ELSE 0
            END), 0) AS avg_turnover_rate,
            COUNT(CASE WHEN CAST("6개월평균판매수량" AS DECIMAL) = 0 OR "6개월평균판매수량" IS NULL THEN 1 END) AS slow_moving_count,
            COUNT(CASE WHEN CAST("MT24M(금액)" AS DECIMAL) > 0 THEN 1 END) AS obsolete_count
        FROM sap_zmmr0016_inventory
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// ABC grade bucket totals.
async fn fetch_abc_inventory(pool: &PgPool) -> Result<AbcInventory, AppError> {
    let row = sqlx::query_as::<_, AbcInventory>(
        r#"
        SELECT
            COALESCE(SUM(CAST("가용재고금액" AS DECIMAL)), 0) AS a_grade_value,
            COALESCE(SUM(CAST("B등급" AS DECIMAL)), 0) AS b_grade_value,
            COALESCE(SUM(CAST("C등급" AS DECIMAL)), 0) AS c_grade_value,
            COALESCE(SUM(CAST("D등급" AS DECIMAL)), 0) AS d_grade_value,
            COALESCE(SUM(CAST("등급재고금액" AS DECIMAL)), 0) AS total_grade_value
        FROM sap_zmmr0016_inventory
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Percentage of ordered quantity already issued, across all order lines.
async fn fetch_order_fulfillment(pool: &PgPool) -> Result<OrderFulfillment, AppError> {
    let row = sqlx::query_as::<_, OrderFulfillment>(
        r#"
        SELECT
            COALESCE(AVG(CASE
                WHEN CAST("오더수량" AS DECIMAL) > 0
                THEN COALESCE(CAST("출고수량" AS DECIMAL), 0) / CAST("오더수량" AS DECIMAL) * 100
                ELSE 0
            END), 0) AS fulfillment_rate,
            COUNT(*) AS total_orders,
            COUNT(CASE WHEN CAST("출고수량" AS DECIMAL) >= CAST("오더수량" AS DECIMAL) THEN 1 END) AS completed_orders
        FROM sap_zsdr0062_sales_orders
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Top-10 customers by lifetime billing total.
async fn fetch_top_customers(pool: &PgPool) -> Result<Vec<CustomerSales>, AppError> {
    let rows = sqlx::query_as::<_, CustomerSales>(
        r#"
        SELECT
            "판매처명" AS customer,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS total_sales,
            COUNT(DISTINCT "대금청구문서") AS invoice_count
        FROM sap_zsdr0340_sales_detail
        WHERE "판매처명" IS NOT NULL
        GROUP BY "판매처명"
        ORDER BY total_sales DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Stock quantity/value per age bucket, oldest last.
async fn fetch_inventory_trend(pool: &PgPool) -> Result<Vec<InventoryTrendPoint>, AppError> {
    let rows = sqlx::query_as::<_, InventoryTrendPoint>(
        r#"
        SELECT
            'LT3M' AS period,
            COALESCE(SUM(CAST("LT3M(수량)" AS DECIMAL)), 0) AS quantity,
            COALESCE(SUM(CAST("LT3M(금액)" AS DECIMAL)), 0) AS amount
        FROM sap_zmmr0016_inventory
        UNION ALL
        SELECT
            'LT6M' AS period,
            COALESCE(SUM(CAST("LT6M(수량)" AS DECIMAL)), 0) AS quantity,
            COALESCE(SUM(CAST("LT6M(금액)" AS DECIMAL)), 0) AS amount
        FROM sap_zmmr0016_inventory
        UNION ALL
        SELECT
            'LT12M' AS period,
            COALESCE(SUM(CAST("LT12M(수량)" AS DECIMAL)), 0) AS quantity,
            COALESCE(SUM(CAST("LT12M(금액)" AS DECIMAL)), 0) AS amount
        FROM sap_zmmr0016_inventory
        UNION ALL
        SELECT
            'LT24M' AS period,
            COALESCE(SUM(CAST("LT24M(수량)" AS DECIMAL)), 0) AS quantity,
            COALESCE(SUM(CAST("LT24M(금액)" AS DECIMAL)), 0) AS amount
        FROM sap_zmmr0016_inventory
        ORDER BY period
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
