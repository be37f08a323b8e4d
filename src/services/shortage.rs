//! Shortage analysis dashboard: undeliverable order lines and remedies.
//!
//! A line is short when its ordered quantity exceeds the deliverable
//! quantity. Urgency buckets come from the item due date relative to today:
//! Overdue, then Critical/High/Medium at 3/7/14 days out, else Low.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;

/// Full payload for `GET /api/dashboard/shortage`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortageReport {
    pub shortage_detail: Vec<ShortageDetail>,
    pub urgency_summary: Vec<UrgencySummary>,
    pub customer_shortage: Vec<CustomerShortage>,
    pub product_shortage: Vec<ProductShortage>,
    pub production_plan: Vec<ProductionPlan>,
    pub delivery_trend: Vec<DeliveryTrend>,
    pub alternative_products: Vec<AlternativeProduct>,
    pub cy_stock_utilization: Vec<CyStockUtilization>,
}

/// One short order line with urgency classification.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ShortageDetail {
    pub sales_order: String,
    pub customer: Option<String>,
    pub material: Option<String>,
    pub material_name: Option<String>,
    pub product_family: Option<String>,
    pub material_group5: Option<String>,
    pub order_qty: i32,
    pub available_stock: i32,
    pub deliverable_qty: i32,
    pub shortage_qty: i32,
    pub deliverable_amount: Decimal,
    pub delivery_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub planned_qty: Option<Decimal>,
    pub production_date: Option<String>,
    pub production_reason: Option<String>,
    pub urgency: String,
}

/// Shortage rollup per urgency bucket.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UrgencySummary {
    pub urgency: String,
    pub order_count: i64,
    pub total_shortage: i64,
    pub shortage_amount: Decimal,
}

/// Shortage rollup per customer, top 20.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CustomerShortage {
    pub customer: Option<String>,
    pub order_count: i64,
    pub total_shortage: i64,
    pub total_order_amount: Decimal,
    pub deliverable_amount: Decimal,
    pub earliest_delivery: Option<NaiveDate>,
}

/// Shortage rollup per material with stock and price context, top 30.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductShortage {
    pub material: Option<String>,
    pub material_name: Option<String>,
    pub product_family: Option<String>,
    pub affected_orders: i64,
    pub total_shortage: i64,
    pub total_available: i64,
    pub avg_sales_qty: Option<Decimal>,
    pub inventory_value: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

/// Planned production checked against the shortage it must cover.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductionPlan {
    pub material: Option<String>,
    pub material_name: Option<String>,
    pub total_order: i64,
    pub total_deliverable: i64,
    pub shortage: i64,
    pub planned_production: i64,
    pub production_date: Option<String>,
    pub production_status: String,
}

/// Shortage totals per due date over the next 30 days.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DeliveryTrend {
    pub delivery_date: NaiveDate,
    pub order_count: i64,
    pub shortage_qty: i64,
    pub shortage_amount: Decimal,
}

/// Same-family material with enough stock to substitute a short one.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AlternativeProduct {
    pub shortage_material: Option<String>,
    pub shortage_qty: i64,
    pub alternative_material: String,
    pub alternative_name: Option<String>,
    pub available_qty: i32,
    pub inventory_value: Decimal,
    pub selling_price: Option<Decimal>,
}

/// CY warehouse stock that could cover a shortage.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CyStockUtilization {
    pub material: Option<String>,
    pub material_name: Option<String>,
    pub shortage_qty: i64,
    pub cy_stock: i64,
    pub solution_status: String,
}

/// Run the full shortage battery. Any statement failure aborts the batch.
pub async fn get_report(pool: &PgPool) -> Result<ShortageReport, AppError> {
    let shortage_detail = fetch_shortage_detail(pool).await?;
    let urgency_summary = fetch_urgency_summary(pool).await?;
    let customer_shortage = fetch_customer_shortage(pool).await?;
    let product_shortage = fetch_product_shortage(pool).await?;
    let production_plan = fetch_production_plan(pool).await?;
    let delivery_trend = fetch_delivery_trend(pool).await?;
    let alternative_products = fetch_alternative_products(pool).await?;
    let cy_stock_utilization = fetch_cy_stock_utilization(pool).await?;

    Ok(ShortageReport {
        shortage_detail,
        urgency_summary,
        customer_shortage,
        product_shortage,
        production_plan,
        delivery_trend,
        alternative_products,
        cy_stock_utilization,
    })
}

/// Short order lines ordered by urgency then shortage size, limit 100.
async fn fetch_shortage_detail(pool: &PgPool) -> Result<Vec<ShortageDetail>, AppError> {
    let rows = sqlx::query_as::<_, ShortageDetail>(
        r#"
        SELECT
            o."판매오더" AS sales_order,
            o."고객명_판매처" AS customer,
            o."자재" AS material,
            o."자재내역" AS material_name,
            o."제품군명" AS product_family,
            o."자재그룹5명" AS material_group5,
            CAST(o."오더수량" AS INTEGER) AS order_qty,
            COALESCE(CAST(o."가용재고" AS INTEGER), 0) AS available_stock,
            CAST(o."납품가능수량" AS INTEGER) AS deliverable_qty,
            CAST(o."오더수량" AS INTEGER) - CAST(o."납품가능수량" AS INTEGER) AS shortage_qty,
            COALESCE(CAST(o."납품가능금액" AS DECIMAL), 0) AS deliverable_amount,
            TO_DATE(o."납기일_품목", 'YYYY-MM-DD') AS delivery_date,
            o."납품우선순위" AS priority,
            o."생산예정수량" AS planned_qty,
            o."생산예정일자" AS production_date,
            o."생산사유" AS production_reason,
            CASE
                WHEN TO_DATE(o."납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE THEN 'Overdue'
                WHEN TO_DATE(o."납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '3 days' THEN 'Critical'
                WHEN TO_DATE(o."납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '7 days' THEN 'High'
                WHEN TO_DATE(o."납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '14 days' THEN 'Medium'
                ELSE 'Low'
            END AS urgency
        FROM sap_zsdr0062_sales_orders o
        WHERE CAST(o."오더수량" AS INTEGER) > CAST(o."납품가능수량" AS INTEGER)
        ORDER BY
            CASE
                WHEN TO_DATE(o."납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE THEN 1
                WHEN TO_DATE(o."납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '3 days' THEN 2
                WHEN TO_DATE(o."납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '7 days' THEN 3
                WHEN TO_DATE(o."납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '14 days' THEN 4
                ELSE 5
            END,
            shortage_qty DESC
        LIMIT 100
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Shortage rollup per urgency bucket.
async fn fetch_urgency_summary(pool: &PgPool) -> Result<Vec<UrgencySummary>, AppError> {
    let rows = sqlx::query_as::<_, UrgencySummary>(
        r#"
        SELECT
            CASE
                WHEN TO_DATE("납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE THEN 'Overdue'
                WHEN TO_DATE("납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '3 days' THEN 'Critical'
                WHEN TO_DATE("납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '7 days' THEN 'High'
                WHEN TO_DATE("납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '14 days' THEN 'Medium'
                ELSE 'Low'
            END AS urgency,
            COUNT(*) AS order_count,
            SUM(CAST("오더수량" AS INTEGER) - CAST("납품가능수량" AS INTEGER)) AS total_shortage,
            COALESCE(SUM(CAST("공급금액" AS DECIMAL) - CAST("납품가능금액" AS DECIMAL)), 0) AS shortage_amount
        FROM sap_zsdr0062_sales_orders
        WHERE CAST("오더수량" AS INTEGER) > CAST("납품가능수량" AS INTEGER)
        GROUP BY
            CASE
                WHEN TO_DATE("납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE THEN 'Overdue'
                WHEN TO_DATE("납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '3 days' THEN 'Critical'
                WHEN TO_DATE("납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '7 days' THEN 'High'
                WHEN TO_DATE("납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '14 days' THEN 'Medium'
                ELSE 'Low'
            END
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Shortage rollup per customer, largest shortfall first.
async fn fetch_customer_shortage(pool: &PgPool) -> Result<Vec<CustomerShortage>, AppError> {
    let rows = sqlx::query_as::<_, CustomerShortage>(
        r#"
        SELECT
            "고객명_판매처" AS customer,
            COUNT(*) AS order_count,
            SUM(CAST("오더수량" AS INTEGER) - CAST("납품가능수량" AS INTEGER)) AS total_shortage,
            COALESCE(SUM(CAST("공급금액" AS DECIMAL)), 0) AS total_order_amount,
            COALESCE(SUM(CAST("납품가능금액" AS DECIMAL)), 0) AS deliverable_amount,
            MIN(TO_DATE("납기일_품목", 'YYYY-MM-DD')) AS earliest_delivery
        FROM sap_zsdr0062_sales_orders
        WHERE CAST("오더수량" AS INTEGER) > CAST("납품가능수량" AS INTEGER)
        GROUP BY "고객명_판매처"
        ORDER BY total_shortage DESC
        LIMIT 20
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Shortage rollup per material joined with stock and list price.
async fn fetch_product_shortage(pool: &PgPool) -> Result<Vec<ProductShortage>, AppError> {
    let rows = sqlx::query_as::<_, ProductShortage>(
        r#"
        SELECT
            o."자재" AS material,
            o."자재내역" AS material_name,
            o."제품군명" AS product_family,
            COUNT(DISTINCT o."판매오더") AS affected_orders,
            SUM(CAST(o."오더수량" AS INTEGER) - CAST(o."납품가능수량" AS INTEGER)) AS total_shortage,
            COALESCE(SUM(CAST(o."가용재고" AS INTEGER)), 0) AS total_available,
            i."6개월평균판매수량" AS avg_sales_qty,
            i."재고금액" AS inventory_value,
            m."판가" AS selling_price
        FROM sap_zsdr0062_sales_orders o
        LEFT JOIN sap_zmmr0016_inventory i ON o."자재" = i."자재"
        LEFT JOIN sap_zmmr0001_materials m ON o."자재" = m."자재"
        WHERE CAST(o."오더수량" AS INTEGER) > CAST(o."납품가능수량" AS INTEGER)
        GROUP BY o."자재", o."자재내역", o."제품군명", i."6개월평균판매수량", i."재고금액", m."판가"
        ORDER BY total_shortage DESC
        LIMIT 30
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Planned production coverage per short material (충족 = covered).
async fn fetch_production_plan(pool: &PgPool) -> Result<Vec<ProductionPlan>, AppError> {
    let rows = sqlx::query_as::<_, ProductionPlan>(
        r#"
        SELECT
            "자재" AS material,
            "자재내역" AS material_name,
            SUM(CAST("오더수량" AS INTEGER)) AS total_order,
            SUM(CAST("납품가능수량" AS INTEGER)) AS total_deliverable,
            SUM(CAST("오더수량" AS INTEGER) - CAST("납품가능수량" AS INTEGER)) AS shortage,
            SUM(CAST("생산예정수량" AS INTEGER)) AS planned_production,
            MAX("생산예정일자") AS production_date,
            CASE
                WHEN SUM(CAST("생산예정수량" AS INTEGER)) >= SUM(CAST("오더수량" AS INTEGER) - CAST("납품가능수량" AS INTEGER))
                THEN '충족'
                ELSE '부족'
            END AS production_status
        FROM sap_zsdr0062_sales_orders
        WHERE CAST("오더수량" AS INTEGER) > CAST("납품가능수량" AS INTEGER)
            AND "생산예정수량" IS NOT NULL
        GROUP BY "자재", "자재내역"
        ORDER BY shortage DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Shortage totals per due date over the next 30 days.
async fn fetch_delivery_trend(pool: &PgPool) -> Result<Vec<DeliveryTrend>, AppError> {
    let rows = sqlx::query_as::<_, DeliveryTrend>(
        r#"
        SELECT
            TO_DATE("납기일_품목", 'YYYY-MM-DD') AS delivery_date,
            COUNT(*) AS order_count,
            SUM(CAST("오더수량" AS INTEGER) - CAST("납품가능수량" AS INTEGER)) AS shortage_qty,
            COALESCE(SUM(CAST("공급금액" AS DECIMAL) - CAST("납품가능금액" AS DECIMAL)), 0) AS shortage_amount
        FROM sap_zsdr0062_sales_orders
        WHERE CAST("오더수량" AS INTEGER) > CAST("납품가능수량" AS INTEGER)
            AND TO_DATE("납기일_품목", 'YYYY-MM-DD') >= CURRENT_DATE
            AND TO_DATE("납기일_품목", 'YYYY-MM-DD') <= CURRENT_DATE + INTERVAL '30 days'
        GROUP BY TO_DATE("납기일_품목", 'YYYY-MM-DD')
        ORDER BY delivery_date
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Materials from the same product family with enough free stock to
/// substitute a short one.
async fn fetch_alternative_products(pool: &PgPool) -> Result<Vec<AlternativeProduct>, AppError> {
    let rows = sqlx::query_as::<_, AlternativeProduct>(
        r#"
        WITH shortage_products AS (
            SELECT
                o."자재" AS material,
                o."제품군명" AS product_family,
                SUM(CAST(o."오더수량" AS INTEGER) - CAST(o."납품가능수량" AS INTEGER)) AS shortage_qty
            FROM sap_zsdr0062_sales_orders o
            WHERE CAST(o."오더수량" AS INTEGER) > CAST(o."납품가능수량" AS INTEGER)
            GROUP BY o."자재", o."제품군명"
        )
        SELECT
            sp.material AS shortage_material,
            sp.shortage_qty,
            i."자재" AS alternative_material,
            i."자재명" AS alternative_name,
            CAST(i."가용재고수량" AS INTEGER) AS available_qty,
            COALESCE(CAST(i."재고금액" AS DECIMAL), 0) AS inventory_value,
            m."판가" AS selling_price
        FROM shortage_products sp
        JOIN sap_zmmr0016_inventory i ON i."제품군명" = sp.product_family
        LEFT JOIN sap_zmmr0001_materials m ON i."자재" = m."자재"
        WHERE i."자재" != sp.material
            AND CAST(i."가용재고수량" AS INTEGER) > sp.shortage_qty
        ORDER BY sp.shortage_qty DESC, i."가용재고수량" DESC
        LIMIT 20
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// CY warehouse stock matched against shortages (즉시해결가능 = fully
/// coverable, 부분해결가능 = partially).
async fn fetch_cy_stock_utilization(pool: &PgPool) -> Result<Vec<CyStockUtilization>, AppError> {
    let rows = sqlx::query_as::<_, CyStockUtilization>(
        r#"
        SELECT
            "자재" AS material,
            "자재내역" AS material_name,
            SUM(CAST("오더수량" AS INTEGER) - CAST("납품가능수량" AS INTEGER)) AS shortage_qty,
            SUM(CAST("CY창고수량" AS INTEGER)) AS cy_stock,
            CASE
                WHEN SUM(CAST("CY창고수량" AS INTEGER)) >= SUM(CAST("오더수량" AS INTEGER) - CAST("납품가능수량" AS INTEGER))
                THEN '즉시해결가능'
                WHEN SUM(CAST("CY창고수량" AS INTEGER)) > 0
                THEN '부분해결가능'
                ELSE '해결불가'
            END AS solution_status
        FROM sap_zsdr0062_sales_orders
        WHERE CAST("오더수량" AS INTEGER) > CAST("납품가능수량" AS INTEGER)
        GROUP BY "자재", "자재내역"
        HAVING SUM(CAST("CY창고수량" AS INTEGER)) > 0
        ORDER BY shortage_qty DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
