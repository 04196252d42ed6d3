//! Weighted request scenarios and the cumulative table used to pick between them.
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use url::Url;
use volley_core::ConfigError;

/// Description of one HTTP request; built fresh for every execution.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl RequestSpec {
    /// An unauthenticated JSON `GET` for `{base}/{resource_path}`.
    pub fn get(base: &Url, resource_path: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            method: Method::GET,
            url: resource_url(base, resource_path),
            headers,
        }
    }
}

fn resource_url(base: &Url, resource_path: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(resource_path.split('/').filter(|s| !s.is_empty()));
    }
    url
}

type RequestBuilder = dyn Fn(&Url) -> RequestSpec + Send + Sync;

/// A named, weighted request pattern.
#[derive(Clone)]
pub struct Scenario {
    name: Arc<str>,
    weight: f64,
    builder: Arc<RequestBuilder>,
}

impl Scenario {
    pub fn new<F>(name: &str, weight: f64, builder: F) -> Self
    where
        F: Fn(&Url) -> RequestSpec + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            weight,
            builder: Arc::new(builder),
        }
    }

    /// Scenario issuing `GET {base}/{resource_path}` with a JSON content type.
    pub fn get(name: &str, weight: f64, resource_path: &str) -> Self {
        let resource_path = resource_path.to_string();
        Self::new(name, weight, move |base| RequestSpec::get(base, &resource_path))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn request(&self, base: &Url) -> RequestSpec {
        (self.builder)(base)
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

/// Scenarios in declaration order alongside their cumulative weight boundaries.
///
/// Weights are relative; they are normalised so the boundaries partition `[0, 1)` and the last
/// boundary is exactly `1.0`.
#[derive(Debug, Clone)]
pub struct ScenarioTable {
    scenarios: Vec<Scenario>,
    boundaries: Vec<f64>,
}

impl ScenarioTable {
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, ConfigError> {
        if scenarios.is_empty() {
            return Err(ConfigError::NoScenarios);
        }

        let mut seen = HashSet::new();
        for scenario in &scenarios {
            if !scenario.weight.is_finite() || scenario.weight <= 0. {
                return Err(ConfigError::InvalidWeight {
                    name: scenario.name().to_string(),
                    weight: scenario.weight,
                });
            }
            if !seen.insert(scenario.name()) {
                return Err(ConfigError::DuplicateScenario(scenario.name().to_string()));
            }
        }

        let total: f64 = scenarios.iter().map(Scenario::weight).sum();
        let mut cumulative = 0.;
        let mut boundaries: Vec<f64> = scenarios
            .iter()
            .map(|s| {
                cumulative += s.weight;
                cumulative / total
            })
            .collect();

        if let Some(last) = boundaries.last_mut() {
            *last = 1.;
        }

        Ok(Self {
            scenarios,
            boundaries,
        })
    }

    /// Pick the first scenario whose cumulative boundary exceeds `draw`, a value in `[0, 1)`.
    pub fn select(&self, draw: f64) -> &Scenario {
        let last = self.scenarios.len() - 1;
        let idx = self
            .boundaries
            .iter()
            .position(|boundary| draw < *boundary)
            .unwrap_or(last);
        &self.scenarios[idx]
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &Scenario {
        self.select(rng.gen::<f64>())
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(Scenario::name).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
