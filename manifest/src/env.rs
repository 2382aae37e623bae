use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    EnvFromSource, EnvVar, EnvVarSource, SecretEnvSource, SecretKeySelector,
};

/// How a secret is injected into a container environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretBinding {
    /// A single environment variable read from one field of a secret.
    Key {
        env_name: String,
        secret_name: String,
        key: String,
    },
    /// Every field of a secret, each exposed under its own key name.
    AllFrom { secret_name: String },
}

impl SecretBinding {
    pub fn key(
        env_name: impl Into<String>,
        secret_name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::Key {
            env_name: env_name.into(),
            secret_name: secret_name.into(),
            key: key.into(),
        }
    }

    pub fn all_from(secret_name: impl Into<String>) -> Self {
        Self::AllFrom {
            secret_name: secret_name.into(),
        }
    }

    pub fn secret_ref(&self) -> SecretRef {
        match self {
            Self::Key {
                secret_name, key, ..
            } => SecretRef {
                secret_name: secret_name.clone(),
                key: Some(key.clone()),
            },
            Self::AllFrom { secret_name } => SecretRef {
                secret_name: secret_name.clone(),
                key: None,
            },
        }
    }
}

/// A reference to a secret, or to a single field of it, used by an environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecretRef {
    pub secret_name: String,
    /// `None` when the whole secret is referenced.
    pub key: Option<String>,
}

/// Resolved container environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    pub vars: Vec<EnvVar>,
    pub from: Vec<EnvFromSource>,
}

/// Builds a container environment from literal values and secret bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvBuilder {
    vars: BTreeMap<String, String>,
    bindings: Vec<SecretBinding>,
}

impl EnvBuilder {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            bindings: Vec::new(),
        }
    }

    /// Exposes the field `key` of secret `secret_name` as the variable `env_name`.
    pub fn with_secret(
        self,
        env_name: impl Into<String>,
        secret_name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.with_binding(SecretBinding::key(env_name, secret_name, key))
    }

    /// Exposes every field of secret `secret_name` as environment variables.
    pub fn with_secrets_from(self, secret_name: impl Into<String>) -> Self {
        self.with_binding(SecretBinding::all_from(secret_name))
    }

    pub fn with_binding(mut self, binding: SecretBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn bindings(&self) -> &[SecretBinding] {
        &self.bindings
    }

    /// Returns every secret reference of this environment, in binding order.
    pub fn secret_refs(&self) -> Vec<SecretRef> {
        self.bindings.iter().map(SecretBinding::secret_ref).collect()
    }

    /// Returns the distinct names of the secrets this environment reads from.
    pub fn secret_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for secret_ref in self.secret_refs() {
            if !names.contains(&secret_ref.secret_name) {
                names.push(secret_ref.secret_name);
            }
        }

        names
    }

    pub fn build(&self) -> Env {
        let mut env = Env::default();

        for (name, value) in &self.vars {
            env.vars.push(EnvVar {
                name: name.clone(),
                value: Some(value.clone()),
                ..EnvVar::default()
            });
        }

        for binding in &self.bindings {
            match binding {
                SecretBinding::Key {
                    env_name,
                    secret_name,
                    key,
                } => env.vars.push(EnvVar {
                    name: env_name.clone(),
                    value_from: Some(EnvVarSource {
                        secret_key_ref: Some(SecretKeySelector {
                            key: key.clone(),
                            name: secret_name.clone().into(),
                            ..SecretKeySelector::default()
                        }),
                        ..EnvVarSource::default()
                    }),
                    ..EnvVar::default()
                }),
                SecretBinding::AllFrom { secret_name } => env.from.push(EnvFromSource {
                    secret_ref: Some(SecretEnvSource {
                        name: secret_name.clone().into(),
                        ..SecretEnvSource::default()
                    }),
                    ..EnvFromSource::default()
                }),
            }
        }

        env
    }
}
