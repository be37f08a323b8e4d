//! Inventory analysis dashboard: turnover, ABC grades, aging, and risk.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;

/// Full payload for `GET /api/dashboard/inventory`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub inventory_turnover: Vec<TurnoverItem>,
    pub abc_detail: Vec<AbcDetail>,
    pub aging_analysis: Vec<AgingBucket>,
    pub obsolete_inventory: Vec<ObsoleteItem>,
    pub special_inventory: SpecialInventory,
    pub efficiency_by_group: Vec<GroupEfficiency>,
    pub supplier_inventory: Vec<SupplierInventory>,
    pub risk_analysis: Vec<RiskBucket>,
}

/// Material in the top or bottom 10 by turnover rate.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TurnoverItem {
    pub material: String,
    pub material_name: Option<String>,
    pub product_family: Option<String>,
    pub inventory_value: Decimal,
    pub avg_sales: Decimal,
    pub turnover_rate: Decimal,
    pub category: String,
}

/// ABC grade totals per inventory status classification.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AbcDetail {
    pub inventory_type: Option<String>,
    pub material_count: i64,
    pub available_value: Decimal,
    pub b_grade: Decimal,
    pub c_grade: Decimal,
    pub d_grade: Decimal,
    pub grade_total_value: Decimal,
}

/// Stock totals per holding-age bucket.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AgingBucket {
    pub aging_period: String,
    pub item_count: i64,
    pub total_value: Decimal,
    pub total_quantity: Decimal,
}

/// Material with stock older than 24 months.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ObsoleteItem {
    pub material: String,
    pub material_name: Option<String>,
    pub product_family: Option<String>,
    pub product_group: Option<String>,
    pub inventory_value: Decimal,
    pub available_quantity: Decimal,
    pub obsolete_quantity: Decimal,
    pub obsolete_value: Decimal,
}

/// Consignment, CY, blocked, and rework stock totals.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SpecialInventory {
    pub consignment_stock: Decimal,
    pub cy_stock: Decimal,
    pub blocked_stock: Decimal,
    pub rework_stock: Decimal,
    pub consignment_items: i64,
    pub cy_items: i64,
}

/// Stock efficiency rollup per product group.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct GroupEfficiency {
    pub product_group: String,
    pub material_count: i64,
    pub total_value: Decimal,
    pub total_quantity: Decimal,
    pub avg_turnover_rate: Decimal,
    pub avg_sales_value: Decimal,
}

/// Stock rollup per supplier, top 20 by value.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SupplierInventory {
    pub supplier: String,
    pub material_count: i64,
    pub total_value: Decimal,
    pub total_quantity: Decimal,
    pub avg_sales_quantity: Decimal,
}

/// Item count and value per stock risk level.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RiskBucket {
    pub risk_level: String,
    pub item_count: i64,
    pub total_value: Decimal,
}

/// Run the full inventory battery. Any statement failure aborts the batch.
pub async fn get_report(pool: &PgPool) -> Result<InventoryReport, AppError> {
    let inventory_turnover = fetch_inventory_turnover(pool).await?;
    let abc_detail = fetch_abc_detail(pool).await?;
    let aging_analysis = fetch_aging_analysis(pool).await?;
    let obsolete_inventory = fetch_obsolete_inventory(pool).await?;
    let special_inventory = fetch_special_inventory(pool).await?;
    let efficiency_by_group = fetch_efficiency_by_group(pool).await?;
    let supplier_inventory = fetch_supplier_inventory(pool).await?;
    let risk_analysis = fetch_risk_analysis(pool).await?;

    Ok(InventoryReport {
        inventory_turnover,
        abc_detail,
        aging_analysis,
        obsolete_inventory,
        special_inventory,
        efficiency_by_group,
        supplier_inventory,
        risk_analysis,
    })
}

/// Top and bottom 10 materials by turnover rate.
async fn fetch_inventory_turnover(pool: &PgPool) -> Result<Vec<TurnoverItem>, AppError> {
    let rows = sqlx::query_as::<_, TurnoverItem>(
        r#"
        WITH turnover_calc AS (
            SELECT
                i."자재" AS material,
                i."자재명" AS material_name,
                i."제품군명" AS product_family,
                CAST(i."재고금액" AS DECIMAL) AS inventory_value,
                COALESCE(CAST(i."6개월평균판매금액" AS DECIMAL), 0) AS avg_sales,
                CASE
                    WHEN CAST(i."재고금액" AS DECIMAL) > 0
                    THEN COALESCE(CAST(i."6개월평균판매금액" AS DECIMAL), 0) * 2 / CAST(i."재고금액" AS DECIMAL)
                    ELSE 0
                END AS turnover_rate
            FROM sap_zmmr0016_inventory i
            WHERE CAST(i."재고금액" AS DECIMAL) > 0
        )
        SELECT * FROM (
            (SELECT *, 'top' AS category FROM turnover_calc ORDER BY turnover_rate DESC LIMIT 10)
            UNION ALL
            (SELECT *, 'bottom' AS category FROM turnover_calc WHERE turnover_rate > 0 ORDER BY turnover_rate ASC LIMIT 10)
        ) combined
        ORDER BY category, turnover_rate DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// ABC grade breakdown per inventory status classification.
async fn fetch_abc_detail(pool: &PgPool) -> Result<Vec<AbcDetail>, AppError> {
    let rows = sqlx::query_as::<_, AbcDetail>(
        r#"
        SELECT
            i."재고구분명" AS inventory_type,
            COUNT(DISTINCT i."자재") AS material_count,
            COALESCE(SUM(CAST(i."가용재고금액" AS DECIMAL)), 0) AS available_value,
            COALESCE(SUM(CAST(i."B등급" AS DECIMAL)), 0) AS b_grade,
            COALESCE(SUM(CAST(i."C등급" AS DECIMAL)), 0) AS c_grade,
            COALESCE(SUM(CAST(i."D등급" AS DECIMAL)), 0) AS d_grade,
            COALESCE(SUM(CAST(i."등급재고금액" AS DECIMAL)), 0) AS grade_total_value
        FROM sap_zmmr0016_inventory i
        GROUP BY i."재고구분명"
        ORDER BY available_value DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Stock totals bucketed by holding age, youngest first.
async fn fetch_aging_analysis(pool: &PgPool) -> Result<Vec<AgingBucket>, AppError> {
    let rows = sqlx::query_as::<_, AgingBucket>(
        r#"
        SELECT
            CASE
                WHEN CAST("LT3M(수량)" AS DECIMAL) > 0 THEN '3개월 이내'
                WHEN CAST("LT6M(수량)" AS DECIMAL) > 0 THEN '3-6개월'
                WHEN CAST("LT12M(수량)" AS DECIMAL) > 0 THEN '6-12개월'
                WHEN CAST("LT24M(수량)" AS DECIMAL) > 0 THEN '12-24개월'
                ELSE '24개월 초과'
            END AS aging_period,
            COUNT(*) AS item_count,
            COALESCE(SUM(CAST("재고금액" AS DECIMAL)), 0) AS total_value,
            COALESCE(SUM(CAST("가용재고수량" AS DECIMAL)), 0) AS total_quantity
        FROM sap_zmmr0016_inventory
        GROUP BY
            CASE
                WHEN CAST("LT3M(수량)" AS DECIMAL) > 0 THEN '3개월 이내'
                WHEN CAST("LT6M(수량)" AS DECIMAL) > 0 THEN '3-6개월'
                WHEN CAST("LT12M(수량)" AS DECIMAL) > 0 THEN '6-12개월'
                WHEN CAST("LT24M(수량)" AS DECIMAL) > 0 THEN '12-24개월'
                ELSE '24개월 초과'
            END
        ORDER BY
            CASE
                WHEN CAST("LT3M(수량)" AS DECIMAL) > 0 THEN 1
                WHEN CAST("LT6M(수량)" AS DECIMAL) > 0 THEN 2
                WHEN CAST("LT12M(수량)" AS DECIMAL) > 0 THEN 3
                WHEN CAST("LT24M(수량)" AS DECIMAL) > 0 THEN 4
                ELSE 5
            END
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Top-20 materials by obsolete (>24 months) stock value.
async fn fetch_obsolete_inventory(pool: &PgPool) -> Result<Vec<ObsoleteItem>, AppError> {
    let rows = sqlx::query_as::<_, ObsoleteItem>(
        r#"
        SELECT
            i."자재" AS material,
            i."자재명" AS material_name,
            i."제품군명" AS product_family,
            m."자재그룹7명" AS product_group,
            COALESCE(CAST(i."재고금액" AS DECIMAL), 0) AS inventory_value,
            COALESCE(CAST(i."가용재고수량" AS DECIMAL), 0) AS available_quantity,
            CAST(i."MT24M(수량)" AS DECIMAL) AS obsolete_quantity,
            COALESCE(CAST(i."MT24M(금액)" AS DECIMAL), 0) AS obsolete_value
        FROM sap_zmmr0016_inventory i
        LEFT JOIN sap_zmmr0001_materials m ON i."자재" = m."자재"
        WHERE CAST(i."MT24M(수량)" AS DECIMAL) > 0
        ORDER BY CAST(i."MT24M(금액)" AS DECIMAL) DESC
        LIMIT 20
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Consignment/CY/blocked/rework stock totals.
async fn fetch_special_inventory(pool: &PgPool) -> Result<SpecialInventory, AppError> {
    let row = sqlx::query_as::<_, SpecialInventory>(
        r#"
        SELECT
            COALESCE(SUM(CAST("위탁재고" AS DECIMAL)), 0) AS consignment_stock,
            COALESCE(SUM(CAST("CY재고" AS DECIMAL)), 0) AS cy_stock,
            COALESCE(SUM(CAST("보류재고" AS DECIMAL)), 0) AS blocked_stock,
            COALESCE(SUM(CAST("생산재작업" AS DECIMAL)), 0) AS rework_stock,
            COUNT(CASE WHEN CAST("위탁재고" AS DECIMAL) > 0 THEN 1 END) AS consignment_items,
            COUNT(CASE WHEN CAST("CY재고" AS DECIMAL) > 0 THEN 1 END) AS cy_items
        FROM sap_zmmr0016_inventory
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Stock efficiency rollup per product group.
async fn fetch_efficiency_by_group(pool: &PgPool) -> Result<Vec<GroupEfficiency>, AppError> {
    let rows = sqlx::query_as::<_, GroupEfficiency>(
        r#"
        SELECT
            m."자재그룹7명" AS product_group,
            COUNT(DISTINCT i."자재") AS material_count,
            COALESCE(SUM(CAST(i."재고금액" AS DECIMAL)), 0) AS total_value,
            COALESCE(SUM(CAST(i."가용재고수량" AS DECIMAL)), 0) AS total_quantity,
            COALESCE(AVG(CASE
                WHEN CAST(i."재고금액" AS DECIMAL) > 0
                THEN COALESCE(CAST(i."6개월평균판매금액" AS DECIMAL), 0) * 2 / CAST(i."재고금액" AS DECIMAL)
                ELSE 0
            END), 0) AS avg_turnover_rate,
            COALESCE(SUM(CAST(i."6개월평균판매금액" AS DECIMAL)), 0) AS avg_sales_value
        FROM sap_zmmr0016_inventory i
        LEFT JOIN sap_zmmr0001_materials m ON i."자재" = m."자재"
        WHERE m."자재그룹7명" IS NOT NULL
        GROUP BY m."자재그룹7명"
        ORDER BY total_value DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Stock rollup per supplier, top 20 by value.
async fn fetch_supplier_inventory(pool: &PgPool) -> Result<Vec<SupplierInventory>, AppError> {
    let rows = sqlx::query_as::<_, SupplierInventory>(
        r#"
        SELECT
            "공급업체" AS supplier,
            COUNT(DISTINCT "자재") AS material_count,
            COALESCE(SUM(CAST("재고금액" AS DECIMAL)), 0) AS total_value,
            COALESCE(SUM(CAST("가용재고수량" AS DECIMAL)), 0) AS total_quantity,
            COALESCE(AVG(CAST("6개월평균판매수량" AS DECIMAL)), 0) AS avg_sales_quantity
        FROM sap_zmmr0016_inventory
        WHERE "공급업체" IS NOT NULL
        GROUP BY "공급업체"
        ORDER BY total_value DESC
        LIMIT 20
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Item count and value per risk level, most urgent first.
///
/// Risk is derived from the age buckets: anything with >24-month stock is
/// Critical, stock absent from the younger buckets escalates High/Medium.
async fn fetch_risk_analysis(pool: &PgPool) -> Result<Vec<RiskBucket>, AppError> {
    let rows = sqlx::query_as::<_, RiskBucket>(
        r#"
        WITH risk_calc AS (
            SELECT
                CAST(i."재고금액" AS DECIMAL) AS inventory_value,
                CASE
                    WHEN CAST(i."MT24M(수량)" AS DECIMAL) > 0 THEN 'Critical'
                    WHEN CAST(i."LT24M(수량)" AS DECIMAL) = 0 AND CAST(i."LT12M(수량)" AS DECIMAL) = 0 THEN 'High'
                    WHEN CAST(i."LT12M(수량)" AS DECIMAL) = 0 AND CAST(i."LT6M(수량)" AS DECIMAL) = 0 THEN 'Medium'
                    ELSE 'Low'
                END AS risk_level
            FROM sap_zmmr0016_inventory i
            WHERE CAST(i."재고금액" AS DECIMAL) > 0
        )
        SELECT
            risk_level,
            COUNT(*) AS item_count,
            COALESCE(SUM(inventory_value), 0) AS total_value
        FROM risk_calc
        GROUP BY risk_level
        ORDER BY
            CASE risk_level
                WHEN 'Critical' THEN 1
                WHEN 'High' THEN 2
                WHEN 'Medium' THEN 3
                WHEN 'Low' THEN 4
            END
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
