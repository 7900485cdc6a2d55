use std::collections::HashSet;

use uuid::Uuid;

use super::apportion::apportion;
use super::feasibility::{check_feasibility, topic_supply};
use super::rng::{LehmerRng, SelectionRng};
use super::selector::select_items;
use super::types::{
    AssemblyError, ExamForm, FormRequest, ItemPoolEntry, ItemStatus, PoolScope, TopicCoverage,
    TopicTarget,
};

const FORM_NAMESPACE: Uuid = Uuid::from_u128(0x6f8a_2c1e_93d4_4b7a_8e55_0c3f_1d9b_7a21);

/// Builds a form with the default seeded generator.
pub fn build_form(request: &FormRequest) -> Result<ExamForm, AssemblyError> {
    let mut rng = LehmerRng::new(request.seed);
    build_form_with_rng(request, &mut rng)
}

pub fn build_form_with_rng<R: SelectionRng>(
    request: &FormRequest,
    rng: &mut R,
) -> Result<ExamForm, AssemblyError> {
    let targets = apportion(&request.blueprint.weights, request.length)?;
    let mut warnings = Vec::new();

    let pool = dedupe_pool(&request.pool, &mut warnings);
    let published: Vec<ItemPoolEntry> = pool
        .iter()
        .filter(|item| item.status == ItemStatus::Published)
        .cloned()
        .collect();

    let published_ok =
        request.prefer_published_only && check_feasibility(&targets, &published).feasible;

    let (scope, source, items, deficits) = if published_ok {
        let items = select_items(&published, &targets, request.length, rng);
        (PoolScope::PublishedOnly, published, items, None)
    } else {
        if request.prefer_published_only {
            tracing::warn!(
                blueprint = %request.blueprint.id,
                published = published.len(),
                "published items cannot satisfy blueprint, falling back to full pool"
            );
            warnings.push(format!(
                "published items ({}) cannot satisfy blueprint; using full pool",
                published.len()
            ));
        }

        let report = check_feasibility(&targets, &pool);
        if report.feasible {
            let items = select_items(&pool, &targets, request.length, rng);
            (PoolScope::FullPool, pool, items, None)
        } else {
            tracing::warn!(
                blueprint = %request.blueprint.id,
                deficits = ?report.deficits,
                "item pool is infeasible, degrading to best effort"
            );
            warnings.push("item pool cannot satisfy blueprint; form is best effort".to_string());
            let items: Vec<String> = pool
                .iter()
                .take(request.length)
                .map(|item| item.id.clone())
                .collect();
            (PoolScope::BestEffort, pool, items, Some(dedupe(report.deficits)))
        }
    };

    if items.len() < request.length {
        warnings.push(format!(
            "form is short: requested {}, delivered {}",
            request.length,
            items.len()
        ));
    }

    let coverage = compute_coverage(&targets, &source, &items);
    let id = form_id(
        &request.blueprint.id,
        request.length,
        request.seed,
        scope,
        &items,
    );

    tracing::info!(
        form = %id,
        blueprint = %request.blueprint.id,
        scope = scope.as_str(),
        selected = items.len(),
        "form assembled"
    );

    Ok(ExamForm {
        id,
        blueprint_id: request.blueprint.id.clone(),
        length: request.length,
        seed: request.seed,
        items,
        coverage,
        warnings: dedupe(warnings),
        scope,
        deficits,
    })
}

/// Required vs delivered vs available for each blueprint topic.
pub fn compute_coverage(
    targets: &[TopicTarget],
    source: &[ItemPoolEntry],
    selected: &[String],
) -> Vec<TopicCoverage> {
    let supply = topic_supply(targets, source);
    let chosen: HashSet<&str> = selected.iter().map(String::as_str).collect();

    targets
        .iter()
        .map(|target| {
            let delivered = source
                .iter()
                .filter(|item| chosen.contains(item.id.as_str()) && item.covers(&target.topic_id))
                .count();
            TopicCoverage {
                topic_id: target.topic_id.clone(),
                required: target.required,
                delivered,
                available: supply.get(&target.topic_id).copied().unwrap_or(0),
            }
        })
        .collect()
}

fn dedupe_pool(pool: &[ItemPoolEntry], warnings: &mut Vec<String>) -> Vec<ItemPoolEntry> {
    let mut seen = HashSet::with_capacity(pool.len());
    let mut out = Vec::with_capacity(pool.len());
    for item in pool {
        if seen.insert(item.id.as_str()) {
            out.push(item.clone());
        } else {
            warnings.push(format!("duplicate pool item {} ignored", item.id));
        }
    }
    out
}

fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Same request and same selection give the same id; item ids are
/// NUL-separated so no two selections share a key.
fn form_id(
    blueprint_id: &str,
    length: usize,
    seed: u64,
    scope: PoolScope,
    items: &[String],
) -> String {
    let mut key = format!("{blueprint_id}:{length}:{seed}:{}", scope.as_str());
    for item in items {
        key.push('\0');
        key.push_str(item);
    }
    Uuid::new_v5(&FORM_NAMESPACE, key.as_bytes()).to_string()
}
