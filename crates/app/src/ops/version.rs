use std::convert::Infallible;

use clap::Args;

use crate::build_info::BuildInfo;

#[derive(Args, Debug, Clone)]
pub struct Version;

#[async_trait::async_trait]
impl crate::op::Op for Version {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        Ok(BuildInfo::current().to_string())
    }
}
