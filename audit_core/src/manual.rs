/*!

This is the long-form manual for `audit_core` and `rlastat`.

## What this crate covers

`audit_core` implements the client-side core of a risk-limiting-audit
election tool:

* the navigation state machine of the county audit wizard
  ([`crate::wizard`]);
* the derivation of the one-line status shown per county on the state
  dashboard ([`crate::county_and_board_label`] and
  [`crate::status_indicator`]);
* the supporting data model: county status snapshots, cast vote records,
  audit board interpretations and ballot sequence assignments
  ([`crate::ballot`]).

Everything here is synchronous and pure. Polling the server, the global
store and the HTTP submission of interpretations are collaborators that
live outside this crate: the wizard advances optimistically after firing
a submission and reconciles through the next status snapshot, never
through a callback.

## The wizard

```
use audit_core::wizard::{Wizard, WizardStage};

let mut wizard = Wizard::new(None);
assert_eq!(wizard.stage(), WizardStage::List);
wizard.advance(); // pick a ballot
wizard.advance(); // review the entered interpretation
wizard.advance(); // back to auditing the next ballot
assert_eq!(wizard.stage(), WizardStage::BallotAudit);
```

Retreating from the ballot list is a no-op: the list is the entry point.

## Status snapshots

County status snapshots arrive as JSON from the dashboard polling
endpoint. The `rlastat` binary parses a snapshot file, derives labels and
indicators for every county, and prints the sorted dashboard table as
JSON. See the `--status`, `--sort` and `--reference` flags.

*/
