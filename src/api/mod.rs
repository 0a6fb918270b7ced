use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    DEFAULT_BRACKETS, GrowthInput, GrowthResult, InvalidInput, IssueList, RetirementOutlook,
    SavingsSplit, TaxBracket, TaxResult, compute_tax, halved_value, project_growth,
    retirement_outlook, rule_of_72_halving_years, savings_plan,
};
use crate::market::{MarketDataClient, MarketDataError};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Withdrawal rate assumed when the retirement form leaves it blank.
const DEFAULT_WITHDRAWAL_RATE_PERCENT: f64 = 4.0;
/// Inflation rate assumed when the halving form leaves it blank.
const DEFAULT_INFLATION_RATE_PERCENT: f64 = 9.1;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SavingsRatePayload {
    annual_salary: Option<f64>,
    percent_saved: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GrowthPayload {
    years: Option<u32>,
    annual_contribution: Option<f64>,
    annual_rate_percent: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RetirementPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    annual_expenses: Option<f64>,
    withdrawal_rate_percent: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InflationPayload {
    amount: Option<f64>,
    annual_rate_percent: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    taxable_income: Option<f64>,
    brackets: Option<Vec<ApiTaxBracket>>,
}

/// Bracket as it appears on the wire; a null or absent `upperBound` marks
/// the unbounded final bracket.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTaxBracket {
    rate: f64,
    upper_bound: Option<f64>,
}

impl From<ApiTaxBracket> for TaxBracket {
    fn from(value: ApiTaxBracket) -> Self {
        TaxBracket {
            rate: value.rate,
            upper_bound: value.upper_bound.unwrap_or(f64::INFINITY),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InflationOutlook {
    years_until_halved: f64,
    halved_value: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct MonthlyHistoryParams {
    symbol: String,
}

fn missing_fields(fields: &[(&str, bool)]) -> InvalidInput {
    InvalidInput {
        issues: fields
            .iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| format!("{name} is required"))
            .collect(),
    }
}

fn savings_rate_request(payload: &SavingsRatePayload) -> Result<SavingsSplit, InvalidInput> {
    let (Some(annual_salary), Some(percent_saved)) =
        (payload.annual_salary, payload.percent_saved)
    else {
        return Err(missing_fields(&[
            ("annualSalary", payload.annual_salary.is_none()),
            ("percentSaved", payload.percent_saved.is_none()),
        ]));
    };
    savings_plan(annual_salary, percent_saved)
}

fn growth_request(payload: &GrowthPayload) -> Result<GrowthResult, InvalidInput> {
    let (Some(years), Some(annual_contribution), Some(annual_rate_percent)) = (
        payload.years,
        payload.annual_contribution,
        payload.annual_rate_percent,
    ) else {
        return Err(missing_fields(&[
            ("years", payload.years.is_none()),
            ("annualContribution", payload.annual_contribution.is_none()),
            ("annualRatePercent", payload.annual_rate_percent.is_none()),
        ]));
    };
    project_growth(&GrowthInput {
        years,
        annual_contribution,
        annual_rate_percent,
    })
}

fn retirement_request(payload: &RetirementPayload) -> Result<RetirementOutlook, InvalidInput> {
    let (Some(current_age), Some(retirement_age), Some(annual_expenses)) = (
        payload.current_age,
        payload.retirement_age,
        payload.annual_expenses,
    ) else {
        return Err(missing_fields(&[
            ("currentAge", payload.current_age.is_none()),
            ("retirementAge", payload.retirement_age.is_none()),
            ("annualExpenses", payload.annual_expenses.is_none()),
        ]));
    };
    retirement_outlook(
        current_age,
        retirement_age,
        annual_expenses,
        payload
            .withdrawal_rate_percent
            .unwrap_or(DEFAULT_WITHDRAWAL_RATE_PERCENT),
    )
}

fn inflation_request(payload: &InflationPayload) -> Result<InflationOutlook, InvalidInput> {
    let Some(amount) = payload.amount else {
        return Err(missing_fields(&[("amount", true)]));
    };
    let rate_percent = payload
        .annual_rate_percent
        .unwrap_or(DEFAULT_INFLATION_RATE_PERCENT);

    let mut issues = IssueList::new();
    issues.require(amount.is_finite() && amount > 0.0, "amount must be > 0");
    issues.require(
        rate_percent.is_finite() && rate_percent > 0.0,
        "annualRatePercent must be > 0",
    );
    issues.into_result()?;

    Ok(InflationOutlook {
        years_until_halved: rule_of_72_halving_years(rate_percent)?,
        halved_value: halved_value(amount),
    })
}

fn tax_request(payload: TaxPayload) -> Result<TaxResult, InvalidInput> {
    let Some(taxable_income) = payload.taxable_income else {
        return Err(missing_fields(&[("taxableIncome", true)]));
    };
    let brackets: Vec<TaxBracket> = match payload.brackets {
        Some(table) => table.into_iter().map(TaxBracket::from).collect(),
        None => DEFAULT_BRACKETS.to_vec(),
    };
    compute_tax(taxable_income, &brackets)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let market = match MarketDataClient::from_env() {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("historical data disabled: {e}");
            None
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/savings-rate",
            get(savings_rate_get_handler).post(savings_rate_post_handler),
        )
        .route(
            "/api/compound-growth",
            get(growth_get_handler).post(growth_post_handler),
        )
        .route(
            "/api/retirement",
            get(retirement_get_handler).post(retirement_post_handler),
        )
        .route(
            "/api/inflation",
            get(inflation_get_handler).post(inflation_post_handler),
        )
        .route(
            "/api/tax-savings",
            get(tax_get_handler).post(tax_post_handler),
        )
        .route("/api/history/monthly", get(monthly_history_handler))
        .route("/api/history/inflation", get(inflation_history_handler))
        .fallback(not_found_handler)
        .with_state(market);

    let listener = TcpListener::bind(addr).await?;
    info!("wellness HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn savings_rate_get_handler(Query(payload): Query<SavingsRatePayload>) -> Response {
    calculation_response(savings_rate_request(&payload))
}

async fn savings_rate_post_handler(Json(payload): Json<SavingsRatePayload>) -> Response {
    calculation_response(savings_rate_request(&payload))
}

async fn growth_get_handler(Query(payload): Query<GrowthPayload>) -> Response {
    calculation_response(growth_request(&payload))
}

async fn growth_post_handler(Json(payload): Json<GrowthPayload>) -> Response {
    calculation_response(growth_request(&payload))
}

async fn retirement_get_handler(Query(payload): Query<RetirementPayload>) -> Response {
    calculation_response(retirement_request(&payload))
}

async fn retirement_post_handler(Json(payload): Json<RetirementPayload>) -> Response {
    calculation_response(retirement_request(&payload))
}

async fn inflation_get_handler(Query(payload): Query<InflationPayload>) -> Response {
    calculation_response(inflation_request(&payload))
}

async fn inflation_post_handler(Json(payload): Json<InflationPayload>) -> Response {
    calculation_response(inflation_request(&payload))
}

async fn tax_get_handler(Query(payload): Query<TaxPayload>) -> Response {
    calculation_response(tax_request(payload))
}

async fn tax_post_handler(Json(payload): Json<TaxPayload>) -> Response {
    calculation_response(tax_request(payload))
}

async fn monthly_history_handler(
    State(market): State<Option<MarketDataClient>>,
    Query(params): Query<MonthlyHistoryParams>,
) -> Response {
    let symbol = params.symbol.trim();
    if symbol.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "symbol is required");
    }
    let Some(client) = market else {
        return market_error_response(MarketDataError::MissingApiKey);
    };
    match client.monthly_rate_of_return(symbol).await {
        Ok(points) => json_response(StatusCode::OK, points),
        Err(e) => market_error_response(e),
    }
}

async fn inflation_history_handler(State(market): State<Option<MarketDataClient>>) -> Response {
    let Some(client) = market else {
        return market_error_response(MarketDataError::MissingApiKey);
    };
    match client.inflation_history().await {
        Ok(points) => json_response(StatusCode::OK, points),
        Err(e) => market_error_response(e),
    }
}

fn calculation_response<T: Serialize>(result: Result<T, InvalidInput>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

fn market_error_response(e: MarketDataError) -> Response {
    error!("historical data fetch failed: {e}");
    error_response(StatusCode::BAD_GATEWAY, &e.to_string())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
