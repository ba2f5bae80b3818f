/*!

This is the long-form manual for `tally_entry` and `tallyentry`.

## Entering numbers

Every field holds a non-negative integer. The text of a field is replaced after
each keystroke by its canonical form, so the operator always sees what will be
sent:

| typed or pasted | shown       | value     |
|-----------------|-------------|-----------|
| `12345`         | `12.345`    | 12345     |
| `1.000.000`     | `1.000.000` | 1000000   |
| `abc`           | `0`         | 0         |
| `1234567890`    | `123.456.789` | 123456789 |

Everything that is not a digit is dropped. Digits beyond the limit (9 by
default) are dropped too. No error is ever shown for what is typed.

## Keyboard

* **Shift+Enter** (the commit signal) moves to the next field. On the last
  field it moves to the submit control; on the submit control it submits.
* **Enter** alone does nothing. This is deliberate: keyboards repeating a key
  or input methods confirming a composition must never skip fields or send
  the form.
* The submit control can also be activated directly.

One submit action sends exactly one request. While a request is outstanding
the submit control is disabled and keystrokes are dropped.

## Request and response

The form is sent to
`POST /api/polling_stations/{polling_station_id}/data_entries/{entry_number}`
with all the values of the entry, nested by their dotted names:

```text
{ "data": {
    "voters_counts":      { "poll_card_count": 0, ... },
    "votes_counts":       { "blank_votes_count": 0, ... },
    "differences_counts": { "more_ballots_count": 0, ... } } }
```

The service answers with the issues it found:

```text
{ "validation_results": {
    "errors":   [ { "fields": ["data.differences_counts.more_ballots_count"], "code": "F301" } ],
    "warnings": [] } }
```

## Issue codes

| Code       | Kind    | Meaning |
|------------|---------|---------|
| F301, F303 | error   | a count does not match the surplus or deficit of ballots |
| F302, F304 | error   | a count must be zero given the surplus or deficit |
| F305       | error   | all difference fields must be zero when there is no surplus or deficit |
| W301, W302 | warning | the explanations do not add up |

Codes that are not listed are shown with a generic text. Whether an issue is
an error or a warning is decided by the list it appears in, not by its code.

## Errors and warnings

* Errors always block. The operator corrects the values and submits again.
* Warnings block until the operator confirms them. Submitting again without
  confirming shows a prompt and sends nothing. After confirming, the next
  submission proceeds even if the service reports the same warnings again.
* Changing a value withdraws the confirmation. A response reporting a
  different set of warnings also withdraws it.
* When the service cannot be reached, nothing is annotated and the operator
  may retry.

Each field covered by an issue shows the issue's message. The banner above
the form shows each issue once, and only the most severe group: warnings are
listed once there are no errors left.

The annotations of a field stay visible after it is edited, until the next
response arrives.

## The `tallyentry` program

`tallyentry` drives the forms from the terminal, one command per line:

| Command         | Effect |
|-----------------|--------|
| `type <text>`   | replaces the text of the focused field |
| `enter`         | a plain line-break (does nothing) |
| `shift-enter`   | the commit signal |
| `focus <field>` | focuses a field by its dotted path or its last component |
| `submit`        | activates the submit control |
| `accept`        | confirms the warnings |
| `show`          | prints the form |
| `quit`          | stops |

The sections are entered in order: admitted voters and votes cast, then the
differences. The values of an accepted section are carried into the next.

Configuration is read from a JSON file given with `--config`:

```text
{
  "serverUrl": "http://localhost:8080",
  "pollingStationId": 1,
  "entryNumber": 1,
  "maxDigits": 9,
  "timeoutSeconds": 10,
  "defaults": { "data.voters_counts.poll_card_count": 0 }
}
```

Command line flags override the file.

 */
