//! Resolution of VRF expressions against the ingress interface.

use crate::policy::VrfExpr;

/// Resolves [`VrfExpr`]s to VRF names. Names are not checked for existence.
#[derive(Debug, Clone, Copy)]
pub struct VrfExprEvaluator<'a> {
    src_interface_vrf: &'a str,
}

impl<'a> VrfExprEvaluator<'a> {
    pub fn new(src_interface_vrf: &'a str) -> Self {
        Self { src_interface_vrf }
    }

    pub fn resolve<'b>(&self, expr: &'b VrfExpr) -> &'b str
    where
        'a: 'b,
    {
        match expr {
            VrfExpr::LiteralVrfName(name) => name,
            VrfExpr::IngressInterfaceVrf => self.src_interface_vrf,
        }
    }
}
