//! Loading of compiled contract artifacts
//!
//! Artifacts are Truffle-format JSON files named `<ContractName>.json`, of which
//! only the contract name, ABI, and creation bytecode are read.

use std::{fs, path::PathBuf};

use alloy::{
    dyn_abi::{DynSolValue, Specifier},
    json_abi::{JsonAbi, Param},
    primitives::Bytes,
};
use serde::Deserialize;

use crate::{constants::ARTIFACT_EXTENSION, errors::ScriptError, types::ConstructorArg};

/// A compiled contract
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// The name of the contract
    pub contract_name: String,
    /// The contract's ABI
    pub abi: JsonAbi,
    /// The contract's creation bytecode
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// The parameters of the contract's constructor
    pub fn constructor_inputs(&self) -> &[Param] {
        self.abi
            .constructor
            .as_ref()
            .map(|constructor| constructor.inputs.as_slice())
            .unwrap_or_default()
    }

    /// The creation bytecode followed by the ABI-encoded constructor arguments.
    ///
    /// The arguments are checked against the constructor's parameters.
    pub fn deploy_code(&self, args: &[ConstructorArg]) -> Result<Bytes, ScriptError> {
        if self.bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has no creation bytecode",
                self.contract_name
            )));
        }

        let inputs = self.constructor_inputs();
        if inputs.len() != args.len() {
            return Err(ScriptError::ConstructorArgs(format!(
                "{} expects {} constructor arguments, got {}",
                self.contract_name,
                inputs.len(),
                args.len()
            )));
        }

        let values = inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let ty = param
                    .resolve()
                    .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
                let value = arg.to_sol_value();
                if !ty.matches(&value) {
                    return Err(ScriptError::ConstructorArgs(format!(
                        "{}: parameter `{}` of type {} cannot take {}",
                        self.contract_name, param.name, param.ty, arg
                    )));
                }

                Ok(value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut code = self.bytecode.to_vec();
        if !values.is_empty() {
            code.extend(DynSolValue::Tuple(values).abi_encode_params());
        }

        Ok(code.into())
    }
}

/// A directory of compiled contract artifacts
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The build directory
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store reading from `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The path of the named contract's artifact
    pub fn artifact_path(&self, contract_name: &str) -> PathBuf {
        self.dir.join(format!("{contract_name}.{ARTIFACT_EXTENSION}"))
    }

    /// Load the named contract's artifact
    pub fn load(&self, contract_name: &str) -> Result<ContractArtifact, ScriptError> {
        let path = self.artifact_path(contract_name);
        let contents = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))
    }
}
