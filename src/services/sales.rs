//! Sales analysis dashboard: daily trend, segment breakdowns, and growth.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;

/// Full payload for `GET /api/dashboard/sales`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub daily_sales: Vec<DailySales>,
    pub sales_by_product_group: Vec<ProductGroupBreakdown>,
    pub customer_sales_trend: Vec<CustomerTrendPoint>,
    pub sales_by_designer: Vec<DesignerSales>,
    pub order_type_analysis: Vec<OrderTypeAnalysis>,
    pub quarterly_growth: Vec<QuarterlyGrowth>,
    pub best_selling_products: Vec<BestSellingProduct>,
    pub sales_by_region: Vec<RegionSales>,
}

/// One day of billing totals over the trailing 30 days.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub invoice_count: i64,
    pub customer_count: i64,
}

/// Current-month sales per product group with price/discount averages.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductGroupBreakdown {
    pub product_group: String,
    pub total_sales: Decimal,
    pub total_quantity: Decimal,
    pub material_count: i64,
    pub avg_price: Decimal,
    pub avg_discount: Decimal,
}

/// Monthly sales for one of the top-5 customers over the last six months.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CustomerTrendPoint {
    pub customer: String,
    pub month: String,
    pub sales: Decimal,
}

/// Current-month sales attributed to a design house.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DesignerSales {
    pub designer: String,
    pub total_sales: Decimal,
    pub invoice_count: i64,
    pub material_variety: i64,
    pub avg_margin: Decimal,
}

/// Current-month sales grouped by SAP order type.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct OrderTypeAnalysis {
    pub order_type: Option<String>,
    pub order_count: i64,
    pub total_sales: Decimal,
    pub avg_sales: Decimal,
}

/// Quarter-over-quarter growth computed with a LAG window.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct QuarterlyGrowth {
    pub quarter: String,
    pub sales: Decimal,
    pub prev_sales: Option<Decimal>,
    pub growth_rate: Decimal,
}

/// Top product by current-month billing total.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BestSellingProduct {
    pub material: Option<String>,
    pub material_name: Option<String>,
    pub product_group: Option<String>,
    pub total_quantity: Decimal,
    pub total_sales: Decimal,
    pub customer_count: i64,
    pub avg_price: Decimal,
}

/// Current-month sales per customer region.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RegionSales {
    pub region: String,
    pub customer_count: i64,
    pub total_sales: Decimal,
    pub avg_sales: Decimal,
}

/// Run the full sales battery. Any statement failure aborts the batch.
pub async fn get_report(pool: &PgPool) -> Result<SalesReport, AppError> {
    let daily_sales = fetch_daily_sales(pool).await?;
    let sales_by_product_group = fetch_sales_by_product_group(pool).await?;
    let customer_sales_trend = fetch_customer_sales_trend(pool).await?;
    let sales_by_designer = fetch_sales_by_designer(pool).await?;
    let order_type_analysis = fetch_order_type_analysis(pool).await?;
    let quarterly_growth = fetch_quarterly_growth(pool).await?;
    let best_selling_products = fetch_best_selling_products(pool).await?;
    let sales_by_region = fetch_sales_by_region(pool).await?;

    Ok(SalesReport {
        daily_sales,
        sales_by_product_group,
        customer_sales_trend,
        sales_by_designer,
        order_type_analysis,
        quarterly_growth,
        best_selling_products,
        sales_by_region,
    })
}

/// Daily billing totals for the trailing 30 days.
async fn fetch_daily_sales(pool: &PgPool) -> Result<Vec<DailySales>, AppError> {
    let rows = sqlx::query_as::<_, DailySales>(
        r#"
        SELECT
            TO_DATE("청구일", 'YYYY-MM-DD') AS date,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS sales,
            COUNT(DISTINCT "대금청구문서") AS invoice_count,
            COUNT(DISTINCT "판매처") AS customer_count
        FROM sap_zsdr0340_sales_detail
        WHERE TO_DATE("청구일", 'YYYY-MM-DD') >= CURRENT_DATE - INTERVAL '30 days'
        GROUP BY TO_DATE("청구일", 'YYYY-MM-DD')
        ORDER BY date
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Current-month product group breakdown with average price and discount.
async fn fetch_sales_by_product_group(pool: &PgPool) -> Result<Vec<ProductGroupBreakdown>, AppError> {
    let rows = sqlx::query_as::<_, ProductGroupBreakdown>(
        r#"
        SELECT
            COALESCE("자재그룹7명", '기타') AS product_group,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS total_sales,
            COALESCE(SUM(CAST("청구수량" AS DECIMAL)), 0) AS total_quantity,
            COUNT(DISTINCT "자재") AS material_count,
            COALESCE(AVG(CAST("판가" AS DECIMAL)), 0) AS avg_price,
            COALESCE(AVG(CAST("매출할인" AS DECIMAL)), 0) AS avg_discount
        FROM sap_zsdr0340_sales_detail
        WHERE TO_DATE("청구일", 'YYYY-MM-DD') >= DATE_TRUNC('month', CURRENT_DATE)
        GROUP BY COALESCE("자재그룹7명", '기타')
        ORDER BY total_sales DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Six-month sales trend for the five largest customers.
async fn fetch_customer_sales_trend(pool: &PgPool) -> Result<Vec<CustomerTrendPoint>, AppError> {
    let rows = sqlx::query_as::<_, CustomerTrendPoint>(
        r#"
        SELECT
            "판매처명" AS customer,
            TO_CHAR(TO_DATE("청구일", 'YYYY-MM-DD'), 'YYYY-MM') AS month,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS sales
        FROM sap_zsdr0340_sales_detail
        WHERE TO_DATE("청구일", 'YYYY-MM-DD') >= DATE_TRUNC('month', CURRENT_DATE - INTERVAL '5 months')
            AND "판매처명" IN (
                SELECT "판매처명"
                FROM sap_zsdr0340_sales_detail
                GROUP BY "판매처명"
                ORDER BY SUM(CAST("청구금액" AS DECIMAL)) DESC
                LIMIT 5
            )
        GROUP BY "판매처명", TO_CHAR(TO_DATE("청구일", 'YYYY-MM-DD'), 'YYYY-MM')
        ORDER BY month, sales DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Current-month sales attributed to design houses, top 20.
async fn fetch_sales_by_designer(pool: &PgPool) -> Result<Vec<DesignerSales>, AppError> {
    let rows = sqlx::query_as::<_, DesignerSales>(
        r#"
        SELECT
            "설계처명" AS designer,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS total_sales,
            COUNT(DISTINCT "대금청구문서") AS invoice_count,
            COUNT(DISTINCT "자재") AS material_variety,
            COALESCE(AVG(CAST("본사마진" AS DECIMAL)), 0) AS avg_margin
        FROM sap_zsdr0340_sales_detail
        WHERE "설계처명" IS NOT NULL
            AND TO_DATE("청구일", 'YYYY-MM-DD') >= DATE_TRUNC('month', CURRENT_DATE)
        GROUP BY "설계처명"
        ORDER BY total_sales DESC
        LIMIT 20
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Current-month sales grouped by SAP order type.
async fn fetch_order_type_analysis(pool: &PgPool) -> Result<Vec<OrderTypeAnalysis>, AppError> {
    let rows = sqlx::query_as::<_, OrderTypeAnalysis>(
        r#"
        SELECT
            "오더TYPE" AS order_type,
            COUNT(*) AS order_count,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS total_sales,
            COALESCE(AVG(CAST("청구금액" AS DECIMAL)), 0) AS avg_sales
        FROM sap_zsdr0340_sales_detail
        WHERE TO_DATE("청구일", 'YYYY-MM-DD') >= DATE_TRUNC('month', CURRENT_DATE)
        GROUP BY "오더TYPE"
        ORDER BY total_sales DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Quarterly totals since last year with quarter-over-quarter growth rate.
async fn fetch_quarterly_growth(pool: &PgPool) -> Result<Vec<QuarterlyGrowth>, AppError> {
    let rows = sqlx::query_as::<_, QuarterlyGrowth>(
        r#"
        WITH quarterly_sales AS (
            SELECT
                TO_CHAR(TO_DATE("청구일", 'YYYY-MM-DD'), 'YYYY-Q') AS quarter,
                COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS sales
            FROM sap_zsdr0340_sales_detail
            WHERE TO_DATE("청구일", 'YYYY-MM-DD') >= DATE_TRUNC('year', CURRENT_DATE - INTERVAL '1 year')
            GROUP BY TO_CHAR(TO_DATE("청구일", 'YYYY-MM-DD'), 'YYYY-Q')
        )
        SELECT
            quarter,
            sales,
            LAG(sales, 1) OVER (ORDER BY quarter) AS prev_sales,
            CASE
                WHEN LAG(sales, 1) OVER (ORDER BY quarter) > 0
                THEN ((sales - LAG(sales, 1) OVER (ORDER BY quarter)) / LAG(sales, 1) OVER (ORDER BY quarter) * 100)
                ELSE 0
            END AS growth_rate
        FROM quarterly_sales
        ORDER BY quarter
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Top-20 products by current-month billing total.
async fn fetch_best_selling_products(pool: &PgPool) -> Result<Vec<BestSellingProduct>, AppError> {
    let rows = sqlx::query_as::<_, BestSellingProduct>(
        r#"
        SELECT
            s."자재" AS material,
            s."자재명" AS material_name,
            m."자재그룹7명" AS product_group,
            COALESCE(SUM(CAST(s."청구수량" AS DECIMAL)), 0) AS total_quantity,
            COALESCE(SUM(CAST(s."청구금액" AS DECIMAL)), 0) AS total_sales,
            COUNT(DISTINCT s."판매처") AS customer_count,
            COALESCE(AVG(CAST(s."판가" AS DECIMAL)), 0) AS avg_price
        FROM sap_zsdr0340_sales_detail s
        LEFT JOIN sap_zmmr0001_materials m ON s."자재" = m."자재"
        WHERE TO_DATE(s."청구일", 'YYYY-MM-DD') >= DATE_TRUNC('month', CURRENT_DATE)
        GROUP BY s."자재", s."자재명", m."자재그룹7명"
        ORDER BY total_sales DESC
        LIMIT 20
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Current-month sales per customer region.
async fn fetch_sales_by_region(pool: &PgPool) -> Result<Vec<RegionSales>, AppError> {
    let rows = sqlx::query_as::<_, RegionSales>(
        r#"
        SELECT
            "판매처지역명" AS region,
            COUNT(DISTINCT "판매처") AS customer_count,
            COALESCE(SUM(CAST("청구금액" AS DECIMAL)), 0) AS total_sales,
            COALESCE(AVG(CAST("청구금액" AS DECIMAL)), 0) AS avg_sales
        FROM sap_zsdr0340_sales_detail
        WHERE "판매처지역명" IS NOT NULL
            AND TO_DATE("청구일", 'YYYY-MM-DD') >= DATE_TRUNC('month', CURRENT_DATE)
        GROUP BY "판매처지역명"
        ORDER BY total_sales DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
